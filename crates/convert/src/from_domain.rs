use spandoc_core::config::ConverterConfig;
use spandoc_core::model::{Log, Process, Span, SpanRef};
use spandoc_core::time::{duration_as_micros, time_as_epoch_micros};
use tracing::debug;

use crate::document::{
    LogDocument, ProcessDocument, ReferenceDocument, ServiceDocument, SpanDocument,
};
use crate::encode::kept_key_value;
use crate::tags::TagPolicy;

/// Converts domain spans into index documents. Holds only the immutable
/// promotion policy, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct FromDomain {
    tags: TagPolicy,
}

impl FromDomain {
    pub fn new(cfg: &ConverterConfig) -> Self {
        let tags = TagPolicy::new(cfg);
        debug!(
            all_tags_as_fields = tags.promotes_all(),
            tag_keys_as_fields = tags.promoted_key_count(),
            dot_replacement = %cfg.tag_dot_replacement,
            "span converter configured"
        );
        Self { tags }
    }

    /// Produces the document with an embedded process and references.
    pub fn convert_span(&self, span: &Span) -> SpanDocument {
        let (tags, tag) = self.tags.classify(&span.tags);
        let start_time = time_as_epoch_micros(&span.start_time);
        SpanDocument {
            trace_id: span.trace_id.to_string(),
            span_id: span.span_id.to_string(),
            parent_span_id: span.parent_span_id.map(|id| id.to_string()),
            flags: span.flags,
            operation_name: span.operation_name.clone(),
            references: self.convert_references(&span.references),
            start_time,
            start_time_millis: start_time / 1000,
            duration: duration_as_micros(span.duration),
            tags,
            tag,
            logs: self.convert_logs(&span.logs),
            process: self.convert_process(&span.process),
        }
    }

    pub fn convert_references(&self, refs: &[SpanRef]) -> Vec<ReferenceDocument> {
        refs.iter()
            .map(|r| ReferenceDocument {
                ref_type: r.ref_type,
                trace_id: r.trace_id.to_string(),
                span_id: r.span_id.to_string(),
            })
            .collect()
    }

    /// Log fields always stay in arrays, whatever the promotion policy says.
    pub fn convert_logs(&self, logs: &[Log]) -> Vec<LogDocument> {
        logs.iter()
            .map(|log| LogDocument {
                timestamp: time_as_epoch_micros(&log.timestamp),
                fields: log.fields.iter().map(kept_key_value).collect(),
            })
            .collect()
    }

    pub fn convert_process(&self, process: &Process) -> ProcessDocument {
        let (tags, tag) = self.tags.classify(&process.tags);
        ProcessDocument {
            service_name: process.service_name.clone(),
            tags,
            tag,
        }
    }

    pub fn convert_service(&self, span: &Span) -> ServiceDocument {
        ServiceDocument {
            service_name: span.process.service_name.clone(),
            operation_name: span.operation_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use spandoc_core::ids::{SpanId, TraceId};
    use spandoc_core::model::{KeyValue, SpanRefType, ValueType};

    use super::*;

    fn span() -> Span {
        Span {
            trace_id: TraceId::new(0, 0xabc),
            span_id: SpanId(0x1),
            parent_span_id: None,
            flags: 1,
            operation_name: "GET /v1/orders".to_string(),
            start_time: Utc.timestamp_opt(1_700_000_000, 999_999_000).single().unwrap(),
            duration: Duration::from_micros(2_500),
            tags: vec![KeyValue::int64("http.status_code", 200)],
            logs: Vec::new(),
            process: Process::new("api"),
            references: Vec::new(),
        }
    }

    #[test]
    fn start_time_millis_truncates() {
        let doc = FromDomain::new(&ConverterConfig::default()).convert_span(&span());
        assert_eq!(doc.start_time, 1_700_000_000_999_999);
        assert_eq!(doc.start_time_millis, 1_700_000_000_999);
        assert_eq!(doc.duration, 2_500);
        assert_eq!(doc.trace_id, "0000000000000abc");
        assert_eq!(doc.span_id, "0000000000000001");
    }

    #[test]
    fn parent_span_id_is_passthrough() {
        let conv = FromDomain::new(&ConverterConfig::default());
        let mut input = span();
        input.references = vec![SpanRef::child_of(input.trace_id, SpanId(0x99))];
        assert!(conv.convert_span(&input).parent_span_id.is_none());

        input.parent_span_id = Some(SpanId(0x7));
        assert_eq!(
            conv.convert_span(&input).parent_span_id.as_deref(),
            Some("0000000000000007")
        );
    }

    #[test]
    fn references_keep_order_and_type() {
        let conv = FromDomain::new(&ConverterConfig::default());
        let trace = TraceId::new(1, 2);
        let out = conv.convert_references(&[
            SpanRef::follows_from(trace, SpanId(3)),
            SpanRef::child_of(trace, SpanId(4)),
        ]);
        assert_eq!(out[0].ref_type, SpanRefType::FollowsFrom);
        assert_eq!(out[0].trace_id, "00000000000000010000000000000002");
        assert_eq!(out[1].ref_type, SpanRefType::ChildOf);
        assert_eq!(out[1].span_id, "0000000000000004");
    }

    #[test]
    fn log_fields_are_never_promoted() {
        let conv = FromDomain::new(&ConverterConfig {
            all_tags_as_fields: true,
            tag_keys_as_fields: vec!["event".to_string()],
            tag_dot_replacement: "_".to_string(),
        });
        let ts = Utc.timestamp_opt(1_700_000_001, 0).single().unwrap();
        let out = conv.convert_logs(&[Log {
            timestamp: ts,
            fields: vec![
                KeyValue::string("event", "retry"),
                KeyValue::int64("attempt.n", 2),
            ],
        }]);
        assert_eq!(out[0].timestamp, 1_700_000_001_000_000);
        assert_eq!(out[0].fields[0].key, "event");
        assert_eq!(out[0].fields[1].key, "attempt.n");
        assert_eq!(out[0].fields[1].value_type, ValueType::Int64);
        assert_eq!(out[0].fields[1].value, "2");
    }

    #[test]
    fn process_tags_follow_span_policy() {
        let conv = FromDomain::new(&ConverterConfig {
            all_tags_as_fields: false,
            tag_keys_as_fields: vec!["host.name".to_string()],
            tag_dot_replacement: "@".to_string(),
        });
        let mut process = Process::new("api");
        process.tags = vec![
            KeyValue::string("host.name", "box-1"),
            KeyValue::string("client-uuid", "abc"),
        ];
        let out = conv.convert_process(&process);
        assert_eq!(out.service_name, "api");
        assert_eq!(out.tags.len(), 1);
        assert_eq!(out.tags[0].key, "client-uuid");
        assert_eq!(
            out.tag.unwrap()["host@name"],
            serde_json::json!("box-1")
        );
    }

    #[test]
    fn service_document_pairs_service_and_operation() {
        let conv = FromDomain::new(&ConverterConfig::default());
        let out = conv.convert_service(&span());
        assert_eq!(out.service_name, "api");
        assert_eq!(out.operation_name, "GET /v1/orders");
    }
}
