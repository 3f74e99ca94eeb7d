//! Loosely-typed parameter mapping and the coercion rules applied to it.
//!
//! # Design
//! Callers pass options as JSON values, so a single option may arrive as a
//! string, a number, a boolean, a list or an object. The helpers here decide
//! which of those shapes each kind of option accepts and turn the accepted
//! ones into strings or flags. Truthiness follows the usual dynamic rules:
//! `null`, `false`, `0` and `""` are falsy, everything else is truthy.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Ordered option name to value mapping. Never mutated by the builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Serialize `body` and store it as the request payload.
    pub fn body<T: Serialize>(self, body: &T) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(self.set("body", value))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// `null` is an empty mapping; any other non-object is rejected.
impl TryFrom<Value> for Params {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(ApiError::invalid(
                "params",
                format!("{other} should be an object."),
            )),
        }
    }
}

/// A value destined for the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Str(String),
    Flag(bool),
}

impl QueryValue {
    pub fn render(&self) -> String {
        match self {
            QueryValue::Str(s) => s.clone(),
            QueryValue::Flag(b) => b.to_string(),
        }
    }
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Stringify a scalar. Integral floats print without a fractional part.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Some(n.to_string())
            } else {
                n.as_f64().map(|f| f.to_string())
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Path segments and `preference`: a truthy, non-object scalar.
pub(crate) fn truthy_scalar(param: &str, value: &Value) -> Result<String, ApiError> {
    match scalar_to_string(value) {
        Some(s) if is_truthy(value) => Ok(s),
        _ => Err(ApiError::invalid(
            param,
            format!("{value} should be a string."),
        )),
    }
}

/// `fields` and the `_source*` family: a string, a list, or a flag.
pub(crate) fn list_or_flag(param: &str, value: &Value) -> Result<QueryValue, ApiError> {
    let invalid = || {
        ApiError::invalid(
            param,
            format!("{value} should be a comma separated list, array, or boolean."),
        )
    };
    match value {
        Value::String(s) => Ok(QueryValue::Str(s.clone())),
        Value::Array(items) => join_list(items).map(QueryValue::Str).ok_or_else(invalid),
        Value::Bool(_) | Value::Number(_) => Ok(QueryValue::Flag(is_truthy(value))),
        Value::Null | Value::Object(_) => Err(invalid()),
    }
}

/// `None` when an element is an object.
fn join_list(items: &[Value]) -> Option<String> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let part = match item {
            Value::Null => String::new(),
            Value::Array(nested) => join_list(nested)?,
            Value::Object(_) => return None,
            scalar => scalar_to_string(scalar)?,
        };
        parts.push(part);
    }
    Some(parts.join(","))
}

/// `realtime` and `refresh`: "no"/"off" switch the flag off.
pub(crate) fn switch(param: &str, value: &Value) -> Result<QueryValue, ApiError> {
    match value {
        Value::Null => Err(ApiError::invalid(
            param,
            "null should be a boolean.",
        )),
        Value::String(s) => {
            let lowered = s.to_lowercase();
            Ok(QueryValue::Flag(
                !(lowered.is_empty() || lowered == "no" || lowered == "off"),
            ))
        }
        other => Ok(QueryValue::Flag(is_truthy(other))),
    }
}

/// `ignore`: a status code or a list of them.
pub(crate) fn status_codes(value: &Value) -> Result<Vec<u16>, ApiError> {
    let single = |v: &Value| {
        v.as_u64()
            .filter(|code| (100..=599).contains(code))
            .map(|code| code as u16)
            .ok_or_else(|| {
                ApiError::invalid(
                    "ignore",
                    format!("{v} should be an HTTP status code or a list of them."),
                )
            })
    };
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(single).collect(),
        other => single(other).map(|code| vec![code]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&v), "{v} should be falsy");
        }
        for v in [json!(true), json!(1), json!(-2.5), json!("x"), json!([]), json!({})] {
            assert!(is_truthy(&v), "{v} should be truthy");
        }
    }

    #[test]
    fn integral_numbers_print_without_fraction() {
        assert_eq!(scalar_to_string(&json!(12)).as_deref(), Some("12"));
        assert_eq!(scalar_to_string(&json!(12.0)).as_deref(), Some("12"));
        assert_eq!(scalar_to_string(&json!(1.5)).as_deref(), Some("1.5"));
    }

    #[test]
    fn truthy_scalar_rejects_falsy_and_objects() {
        assert_eq!(truthy_scalar("index", &json!("idx")).unwrap(), "idx");
        assert_eq!(truthy_scalar("index", &json!(7)).unwrap(), "7");
        for v in [json!(""), json!(0), json!(false), json!(null), json!([]), json!({})] {
            assert!(truthy_scalar("index", &v).unwrap_err().is_invalid_argument());
        }
    }

    #[test]
    fn list_or_flag_shapes() {
        assert_eq!(
            list_or_flag("fields", &json!("a,b")).unwrap(),
            QueryValue::Str("a,b".to_string())
        );
        assert_eq!(
            list_or_flag("fields", &json!(["a", 1, null, ["b", "c"]])).unwrap(),
            QueryValue::Str("a,1,,b,c".to_string())
        );
        assert_eq!(list_or_flag("fields", &json!(0)).unwrap(), QueryValue::Flag(false));
        assert_eq!(list_or_flag("fields", &json!(true)).unwrap(), QueryValue::Flag(true));
        assert!(list_or_flag("fields", &json!({"a": 1})).is_err());
        assert!(list_or_flag("fields", &json!([{"a": 1}])).is_err());
        assert!(list_or_flag("fields", &json!(null)).is_err());
    }

    #[test]
    fn switch_understands_no_and_off() {
        assert_eq!(switch("realtime", &json!("OFF")).unwrap(), QueryValue::Flag(false));
        assert_eq!(switch("realtime", &json!("no")).unwrap(), QueryValue::Flag(false));
        assert_eq!(switch("realtime", &json!("")).unwrap(), QueryValue::Flag(false));
        assert_eq!(switch("realtime", &json!("yes")).unwrap(), QueryValue::Flag(true));
        assert_eq!(switch("realtime", &json!(1)).unwrap(), QueryValue::Flag(true));
        assert_eq!(switch("realtime", &json!({})).unwrap(), QueryValue::Flag(true));
        assert!(switch("realtime", &json!(null)).is_err());
    }

    #[test]
    fn status_codes_accepts_one_or_many() {
        assert_eq!(status_codes(&json!(404)).unwrap(), vec![404]);
        assert_eq!(status_codes(&json!([404, 409])).unwrap(), vec![404, 409]);
        assert!(status_codes(&json!("404")).is_err());
        assert!(status_codes(&json!(99)).is_err());
    }

    #[test]
    fn params_from_value() {
        let params = Params::try_from(json!({"index": "a"})).unwrap();
        assert_eq!(params.get("index"), Some(&json!("a")));
        assert!(Params::try_from(json!(null)).unwrap().is_empty());
        assert!(Params::try_from(json!([1])).is_err());
    }
}
