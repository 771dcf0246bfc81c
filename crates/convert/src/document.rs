//! Index document shapes. Field names are consumed by downstream queries
//! and dashboards and must not change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use spandoc_core::model::{SpanRefType, ValueType};

/// Promoted tags keyed by their dot-free field name.
pub type TagMap = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpanDocument {
    #[serde(rename = "traceID")]
    pub trace_id: String,
    #[serde(rename = "spanID")]
    pub span_id: String,
    #[serde(
        rename = "parentSpanID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_span_id: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub flags: u32,
    #[serde(rename = "operationName")]
    pub operation_name: String,
    pub references: Vec<ReferenceDocument>,
    /// Microseconds since the Unix epoch.
    #[serde(rename = "startTime")]
    pub start_time: u64,
    /// `start_time / 1000`, kept for millisecond range queries.
    #[serde(rename = "startTimeMillis")]
    pub start_time_millis: u64,
    pub duration: u64,
    pub tags: Vec<KeyValueDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagMap>,
    pub logs: Vec<LogDocument>,
    pub process: ProcessDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceDocument {
    #[serde(rename = "refType")]
    pub ref_type: SpanRefType,
    #[serde(rename = "traceID")]
    pub trace_id: String,
    #[serde(rename = "spanID")]
    pub span_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessDocument {
    #[serde(rename = "serviceName")]
    pub service_name: String,
    pub tags: Vec<KeyValueDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagMap>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogDocument {
    pub timestamp: u64,
    pub fields: Vec<KeyValueDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyValueDocument {
    pub key: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub value: String,
}

/// Entry for the service/operation lookup index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceDocument {
    #[serde(rename = "serviceName")]
    pub service_name: String,
    #[serde(rename = "operationName")]
    pub operation_name: String,
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}
