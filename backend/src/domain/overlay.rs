//! Shallow JSON overlays for partial updates.
//!
//! Client patches are plain JSON objects whose top-level keys replace the
//! record's keys. Nested values are replaced wholesale, not merged.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Raised when a patched record no longer fits its typed shape.
#[derive(Debug, thiserror::Error)]
#[error("patched {record} no longer matches its schema: {source}")]
pub struct OverlayError {
    pub record: &'static str,
    #[source]
    pub source: serde_json::Error,
}

impl From<OverlayError> for super::Error {
    fn from(value: OverlayError) -> Self {
        super::Error::invalid_request(value.to_string())
    }
}

/// Overlay `patch` onto `base`, key by key.
///
/// A non-object `base` is replaced by the patch.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use switchgear_pm::domain::overlay::spread;
///
/// let base = json!({"name": "CB1", "brand": "ABB", "nested": {"a": 1}});
/// let patch = json!({"brand": "Siemens", "nested": {"b": 2}});
/// let merged = spread(base, patch.as_object().unwrap().clone());
/// assert_eq!(merged, json!({"name": "CB1", "brand": "Siemens", "nested": {"b": 2}}));
/// ```
pub fn spread(base: Value, patch: Map<String, Value>) -> Value {
    match base {
        Value::Object(mut fields) => {
            fields.extend(patch);
            Value::Object(fields)
        }
        _ => Value::Object(patch),
    }
}

/// Overlay `patch` onto a typed record and read it back.
pub fn apply_patch<T>(
    record: &T,
    patch: Map<String, Value>,
    label: &'static str,
) -> Result<T, OverlayError>
where
    T: Serialize + DeserializeOwned,
{
    let wrap = |source| OverlayError {
        record: label,
        source,
    };
    let base = serde_json::to_value(record).map_err(wrap)?;
    serde_json::from_value(spread(base, patch)).map_err(wrap)
}

/// Truthiness as clients of the stored documents interpret it.
///
/// `null`, `false`, `0` and the empty string are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `value` when truthy, otherwise the empty string.
pub fn truthy_or_blank(value: Option<&Value>) -> Value {
    match value {
        Some(v) if is_truthy(v) => v.clone(),
        _ => Value::String(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Breaker {
        id: i64,
        name: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    }

    #[test]
    fn spread_keeps_unpatched_keys() {
        let merged = spread(
            json!({"a": 1, "b": 2}),
            json!({"b": 3, "c": 4}).as_object().cloned().unwrap_or_default(),
        );
        assert_eq!(merged, json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn apply_patch_adds_unknown_fields_to_extra() {
        let breaker = Breaker {
            id: 1,
            name: "CB1".into(),
            extra: Map::new(),
        };
        let patch = json!({"name": "CB1-renamed", "ratedCurrent": "630A"});
        let patched = apply_patch(&breaker, patch.as_object().cloned().unwrap_or_default(), "breaker")
            .expect("patch fits the schema");
        assert_eq!(patched.name, "CB1-renamed");
        assert_eq!(patched.extra.get("ratedCurrent"), Some(&json!("630A")));
    }

    #[test]
    fn apply_patch_rejects_type_changes() {
        let breaker = Breaker {
            id: 1,
            name: "CB1".into(),
            extra: Map::new(),
        };
        let patch = json!({"id": "one"});
        let err = apply_patch(&breaker, patch.as_object().cloned().unwrap_or_default(), "breaker")
            .expect_err("string id is rejected");
        assert_eq!(err.record, "breaker");
    }

    #[rstest]
    #[case(json!(null), false)]
    #[case(json!(false), false)]
    #[case(json!(0), false)]
    #[case(json!(""), false)]
    #[case(json!(true), true)]
    #[case(json!("done"), true)]
    #[case(json!(2.5), true)]
    #[case(json!([]), true)]
    fn truthiness(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(is_truthy(&value), expected);
    }
}
