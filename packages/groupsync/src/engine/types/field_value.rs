use super::keys::FastMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use smol_str::SmolStr;

/// JSON-like value for the fields of a cached record.
///
/// Records arrive from the write path as `serde_json::Value` documents and
/// are converted once on ingestion; all comparison and grouping work happens
/// on this representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Str(SmolStr),
    Array(Vec<FieldValue>),
    Object(FastMap<SmolStr, FieldValue>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Null
    }
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&FastMap<SmolStr, FieldValue>> {
        match self {
            FieldValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Field lookup on object values.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.as_object()?.get(key)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, FieldValue::Object(_))
    }

    /// The record's stable identifier, when this value is a record object
    /// carrying an `id` field.
    pub fn record_id(&self) -> Option<&str> {
        self.get("id")?.as_str()
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => FieldValue::Str(SmolStr::from(s)),
            Value::Array(arr) => {
                FieldValue::Array(arr.into_iter().map(FieldValue::from).collect())
            }
            Value::Object(obj) => FieldValue::Object(
                obj.into_iter()
                    .map(|(k, v)| (SmolStr::from(k), FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(val: FieldValue) -> Self {
        match val {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Number(n) => json!(n),
            FieldValue::Str(s) => Value::String(s.to_string()),
            FieldValue::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            FieldValue::Object(obj) => Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k.to_string(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}
