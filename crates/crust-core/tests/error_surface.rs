use std::path::Path;

use crust_core::errors::{CrustError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("line", "3")
        .with_context("reason", "example")
}

#[test]
fn parse_error_surface() {
    let err = CrustError::Parse(sample_info("P001", "ragged row"));
    assert_eq!(err.info().code, "P001");
    assert!(err.info().context.contains_key("line"));
}

#[test]
fn run_error_surface() {
    let err = CrustError::Run(sample_info("R001", "spawn failed").with_hint("check binary"));
    assert_eq!(err.info().hint.as_deref(), Some("check binary"));
    let text = err.to_string();
    assert!(text.starts_with("run error: spawn failed (code: R001)"));
    assert!(text.contains("line=3"));
    assert!(text.ends_with("| hint: check binary"));
}

#[test]
fn io_helper_records_path_and_kind() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err = CrustError::io("crust.test_io", Path::new("/tmp/missing"), io);
    assert!(matches!(err, CrustError::Io(_)));
    assert_eq!(err.info().context["path"], "/tmp/missing");
    assert_eq!(err.info().context["kind"], "NotFound");
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = CrustError::Query(ErrorInfo::new("Q001", "column out of range"));
    let value = serde_json::to_value(&err).expect("json");
    assert_eq!(value["family"], "Query");
    assert_eq!(value["detail"]["code"], "Q001");
    let restored: CrustError = serde_json::from_value(value).expect("restore");
    assert_eq!(restored, err);
}
