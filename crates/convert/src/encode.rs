use spandoc_core::hex::encode_hex;
use spandoc_core::model::{KeyValue, TagValue};

use crate::document::KeyValueDocument;

/// Text form used when a tag stays in the `tags` array.
pub fn string_value(value: &TagValue) -> String {
    match value {
        TagValue::String(s) => s.clone(),
        TagValue::Bool(b) => b.to_string(),
        TagValue::Int64(i) => i.to_string(),
        TagValue::Float64(f) => f.to_string(),
        TagValue::Binary(b) => encode_hex(b),
    }
}

/// Native JSON scalar used when a tag is promoted into the `tag` map.
pub fn native_value(value: &TagValue) -> serde_json::Value {
    match value {
        TagValue::String(s) => serde_json::Value::String(s.clone()),
        TagValue::Bool(b) => serde_json::Value::Bool(*b),
        TagValue::Int64(i) => serde_json::Value::from(*i),
        // JSON has no NaN or infinities.
        TagValue::Float64(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
        TagValue::Binary(b) => serde_json::Value::String(encode_hex(b)),
    }
}

pub fn kept_key_value(kv: &KeyValue) -> KeyValueDocument {
    KeyValueDocument {
        key: kv.key.clone(),
        value_type: kv.value_type(),
        value: string_value(&kv.value),
    }
}
