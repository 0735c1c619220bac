use crust_core::ParameterSet;
use crust_exp::ConfigTemplate;
use proptest::prelude::*;

fn line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-zA-Z_]{0,8}[ \t]{1,2}[0-9.e]{1,6}( # [a-z ]{0,10})?",
        "#[ -~]{0,20}",
        "[ \t]{0,3}",
    ]
}

proptest! {
    #[test]
    fn unmatched_overrides_leave_document_untouched(lines in prop::collection::vec(line(), 0..20)) {
        let text: String = lines.iter().map(|l| format!("{l}\n")).collect();
        let template = ConfigTemplate::parse(&text);
        let rendered = template.render(&ParameterSet::new().with("ZZ_not_a_key", 1.0));
        prop_assert_eq!(&rendered.text, &text);
        prop_assert_eq!(rendered.missing, vec!["ZZ_not_a_key".to_string()]);
    }

    #[test]
    fn rewrite_touches_exactly_one_line(
        before in prop::collection::vec(line(), 0..8),
        after in prop::collection::vec(line(), 0..8),
        value in -1.0e6f64..1.0e6,
    ) {
        let keep = |l: &String| !l.trim_start().starts_with("yHe");
        let before: Vec<_> = before.into_iter().filter(keep).collect();
        let after: Vec<_> = after.into_iter().filter(keep).collect();
        let mut lines = before.clone();
        lines.push("yHe\t4".to_string());
        lines.extend(after.iter().cloned());
        let text: String = lines.iter().map(|l| format!("{l}\n")).collect();

        let rendered = ConfigTemplate::parse(&text).render(&ParameterSet::new().with("yHe", value));
        let out: Vec<_> = rendered.text.split_inclusive('\n').collect();
        let original: Vec<_> = text.split_inclusive('\n').collect();
        prop_assert_eq!(out.len(), original.len());
        for (idx, (got, want)) in out.iter().zip(&original).enumerate() {
            if idx == before.len() {
                prop_assert_eq!(got.to_string(), format!("yHe\t{}\n", crust_core::format_value(value)));
            } else {
                prop_assert_eq!(got, want);
            }
        }
    }
}

#[test]
fn documented_example_rewrites_in_place() {
    let template = ConfigTemplate::parse("resume 0\n\nyHe\t4\nmass\t1.62\n# yHe 4\n");
    let rendered = template.render(&ParameterSet::new().with("yHe", 9.0));
    assert_eq!(rendered.text, "resume 0\n\nyHe\t9\nmass\t1.62\n# yHe 4\n");
}
