use crust_core::{format_value, ParameterSet};
use proptest::prelude::*;

proptest! {
    #[test]
    fn formatted_values_round_trip(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        let text = format_value(value);
        let parsed: f64 = text.parse().expect("parse");
        prop_assert_eq!(parsed, if value == 0.0 { 0.0 } else { value });
        prop_assert!(!text.ends_with(".0"));
    }
}

#[test]
fn parameter_sets_serialize_in_insertion_order() {
    let set: ParameterSet = [("yHe", 6.0), ("mass", 1.62)].into_iter().collect();
    let json = serde_json::to_string(&set).expect("json");
    assert_eq!(json, r#"{"yHe":6.0,"mass":1.62}"#);
    let restored: ParameterSet = serde_json::from_str(&json).expect("restore");
    assert_eq!(restored, set);
}
