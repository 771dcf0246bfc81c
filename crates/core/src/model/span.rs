use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{SpanId, TraceId};
use crate::model::kv::KeyValue;
use crate::model::log::Log;
use crate::model::process::Process;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Span {
    pub trace_id: TraceId,
    pub span_id: SpanId,
    /// Deprecated single-parent link, kept alongside `references`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<SpanId>,
    #[serde(default)]
    pub flags: u32,
    pub operation_name: String,
    pub start_time: DateTime<Utc>,
    #[serde(with = "crate::time::human_duration")]
    pub duration: Duration,
    #[serde(default)]
    pub tags: Vec<KeyValue>,
    #[serde(default)]
    pub logs: Vec<Log>,
    #[serde(default)]
    pub process: Process,
    #[serde(default)]
    pub references: Vec<SpanRef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(from = "Option<serde_json::Value>", into = "String")]
pub enum SpanRefType {
    #[default]
    ChildOf,
    FollowsFrom,
}

impl SpanRefType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChildOf => "CHILD_OF",
            Self::FollowsFrom => "FOLLOWS_FROM",
        }
    }
}

// Anything other than an explicit follows-from marker is a child-of edge.
impl From<String> for SpanRefType {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().replace('-', "_").as_str() {
            "FOLLOWS_FROM" => Self::FollowsFrom,
            _ => Self::ChildOf,
        }
    }
}

// Null, missing or non-string markers are child-of edges too.
impl From<Option<serde_json::Value>> for SpanRefType {
    fn from(value: Option<serde_json::Value>) -> Self {
        match value {
            Some(serde_json::Value::String(s)) => Self::from(s),
            _ => Self::ChildOf,
        }
    }
}

impl From<SpanRefType> for String {
    fn from(value: SpanRefType) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpanRef {
    #[serde(default)]
    pub ref_type: SpanRefType,
    pub trace_id: TraceId,
    pub span_id: SpanId,
}

impl SpanRef {
    pub fn child_of(trace_id: TraceId, span_id: SpanId) -> Self {
        Self {
            ref_type: SpanRefType::ChildOf,
            trace_id,
            span_id,
        }
    }

    pub fn follows_from(trace_id: TraceId, span_id: SpanId) -> Self {
        Self {
            ref_type: SpanRefType::FollowsFrom,
            trace_id,
            span_id,
        }
    }
}
