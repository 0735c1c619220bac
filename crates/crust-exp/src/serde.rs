use std::collections::BTreeMap;
use std::iter::FromIterator;

use crust_core::errors::{CrustError, ErrorInfo};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

fn map_err(err: serde_json::Error, code: &str) -> CrustError {
    CrustError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Rebuilds every object with keys in sorted order, whatever map type
/// `serde_json` was compiled with.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serialises `value` as pretty JSON with object keys in sorted order, so equal
/// reports always produce identical bytes.
pub fn to_canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CrustError> {
    let value = serde_json::to_value(value).map_err(|err| map_err(err, "crust_exp.json_encode"))?;
    let mut bytes = serde_json::to_vec_pretty(&canonicalize(value))
        .map_err(|err| map_err(err, "crust_exp.json_encode"))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Restores a value previously written with [`to_canonical_json_bytes`].
pub fn from_json_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CrustError> {
    serde_json::from_slice(bytes).map_err(|err| map_err(err, "crust_exp.json_decode"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crust_core::ParameterSet;

    #[test]
    fn nested_keys_come_out_sorted() {
        let params = ParameterSet::new().with("yHe", 6.0).with("mass", 1.62);
        let nested = vec![("zeta", params.clone()), ("alpha", params)];
        let bytes = to_canonical_json_bytes(&nested).expect("encode");
        let text = String::from_utf8(bytes).expect("utf8");
        let mass = text.find("\"mass\"").expect("mass");
        let yhe = text.find("\"yHe\"").expect("yHe");
        assert!(mass < yhe, "{text}");
        assert!(text.ends_with("]\n"));
    }

    #[test]
    fn encoding_is_stable_across_insertion_order() {
        let forward = ParameterSet::new().with("yHe", 6.0).with("mass", 1.62);
        let reverse = ParameterSet::new().with("mass", 1.62).with("yHe", 6.0);
        assert_eq!(
            to_canonical_json_bytes(&forward).expect("forward"),
            to_canonical_json_bytes(&reverse).expect("reverse")
        );
    }
}
