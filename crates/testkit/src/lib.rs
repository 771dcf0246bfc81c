use std::time::Duration;

use chrono::{TimeZone, Utc};
use spandoc_core::ids::{SpanId, TraceId};
use spandoc_core::model::{KeyValue, Log, Process, Span, SpanRef};

pub const TRACE_ID: TraceId = TraceId {
    high: 0x4bf9_2f35_77b3_4da6,
    low: 0xa3ce_929d_0e0e_4736,
};

/// A span with no tags, logs or references.
pub fn bare_span() -> Span {
    Span {
        trace_id: TRACE_ID,
        span_id: SpanId(0x00f0_67aa_0ba9_02b7),
        parent_span_id: None,
        flags: 0,
        operation_name: "noop".to_string(),
        start_time: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
        duration: Duration::ZERO,
        tags: Vec::new(),
        logs: Vec::new(),
        process: Process::new("api"),
        references: Vec::new(),
    }
}

pub fn sample_span() -> Span {
    let base = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    Span {
        trace_id: TRACE_ID,
        span_id: SpanId(0xc417),
        parent_span_id: Some(SpanId(0x0001)),
        flags: 1,
        operation_name: "cache.get redis".to_string(),
        start_time: base + chrono::Duration::microseconds(900_123),
        duration: Duration::from_millis(700),
        tags: vec![
            KeyValue::int64("http.status_code", 200),
            KeyValue::string("peer.service", "redis"),
            KeyValue::bool("error", true),
            KeyValue::float64("sample.rate", 0.5),
            KeyValue::binary("payload", vec![0xca, 0xfe]),
        ],
        logs: vec![
            Log {
                timestamp: base + chrono::Duration::milliseconds(950),
                fields: vec![
                    KeyValue::string("event", "retrying"),
                    KeyValue::int64("attempt", 2),
                ],
            },
            Log {
                timestamp: base + chrono::Duration::milliseconds(1200),
                fields: vec![KeyValue::string("message", "context deadline exceeded")],
            },
        ],
        process: Process {
            service_name: "api".to_string(),
            tags: vec![
                KeyValue::string("host.name", "box-1"),
                KeyValue::string("client-uuid", "6f1e"),
            ],
        },
        references: vec![
            SpanRef::child_of(TRACE_ID, SpanId(0x0001)),
            SpanRef::follows_from(TRACE_ID, SpanId(0x0002)),
        ],
    }
}
