use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hex::{decode_hex, encode_hex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Bool,
    Int64,
    Float64,
    Binary,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Binary => "binary",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" => Some(Self::String),
            "bool" => Some(Self::Bool),
            "int64" => Some(Self::Int64),
            "float64" => Some(Self::Float64),
            "binary" => Some(Self::Binary),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag value carrying its native payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    String(String),
    Bool(bool),
    Int64(i64),
    Float64(f64),
    Binary(Vec<u8>),
}

impl TagValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::String(_) => ValueType::String,
            Self::Bool(_) => ValueType::Bool,
            Self::Int64(_) => ValueType::Int64,
            Self::Float64(_) => ValueType::Float64,
            Self::Binary(_) => ValueType::Binary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawKeyValue", into = "RawKeyValue")]
pub struct KeyValue {
    pub key: String,
    pub value: TagValue,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: TagValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, TagValue::String(value.into()))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, TagValue::Bool(value))
    }

    pub fn int64(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, TagValue::Int64(value))
    }

    pub fn float64(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, TagValue::Float64(value))
    }

    pub fn binary(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(key, TagValue::Binary(value.into()))
    }

    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }
}

// Wire shape of a domain tag: `{"key": .., "type": .., "value": ..}`.
#[derive(Debug, Serialize, Deserialize)]
struct RawKeyValue {
    key: String,
    #[serde(rename = "type", default)]
    vtype: Option<serde_json::Value>,
    #[serde(default)]
    value: serde_json::Value,
}

impl From<RawKeyValue> for KeyValue {
    fn from(raw: RawKeyValue) -> Self {
        let declared = match &raw.vtype {
            None | Some(serde_json::Value::Null) => Some(ValueType::String),
            Some(serde_json::Value::String(name)) => ValueType::from_name(name),
            Some(_) => None,
        };
        let value = declared
            .and_then(|vtype| typed_value(vtype, &raw.value))
            .unwrap_or_else(|| TagValue::String(value_text(&raw.value)));
        Self {
            key: raw.key,
            value,
        }
    }
}

impl From<KeyValue> for RawKeyValue {
    fn from(kv: KeyValue) -> Self {
        let vtype = Some(serde_json::Value::from(kv.value_type().as_str()));
        let value = match kv.value {
            TagValue::String(s) => serde_json::Value::String(s),
            TagValue::Bool(b) => serde_json::Value::Bool(b),
            TagValue::Int64(i) => serde_json::Value::from(i),
            TagValue::Float64(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
            TagValue::Binary(b) => serde_json::Value::String(encode_hex(&b)),
        };
        Self {
            key: kv.key,
            vtype,
            value,
        }
    }
}

fn typed_value(vtype: ValueType, raw: &serde_json::Value) -> Option<TagValue> {
    let text = raw.as_str();
    match vtype {
        ValueType::String => Some(TagValue::String(value_text(raw))),
        ValueType::Bool => raw
            .as_bool()
            .or_else(|| text.and_then(|s| s.parse().ok()))
            .map(TagValue::Bool),
        ValueType::Int64 => raw
            .as_i64()
            .or_else(|| text.and_then(|s| s.parse().ok()))
            .map(TagValue::Int64),
        ValueType::Float64 => raw
            .as_f64()
            .or_else(|| text.and_then(|s| s.parse().ok()))
            .map(TagValue::Float64),
        ValueType::Binary => match raw {
            serde_json::Value::String(s) => decode_hex(s).map(TagValue::Binary),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|v| v.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(TagValue::Binary),
            _ => None,
        },
    }
}

fn value_text(raw: &serde_json::Value) -> String {
    match raw {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
