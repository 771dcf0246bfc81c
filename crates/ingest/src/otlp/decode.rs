use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::any_value::Value;
use opentelemetry_proto::tonic::common::v1::{AnyValue, InstrumentationScope, KeyValue};
use opentelemetry_proto::tonic::resource::v1::Resource;
use opentelemetry_proto::tonic::trace::v1::Span as OtlpSpan;
use prost::Message;
use spandoc_core::error::{Result, SpandocError};
use spandoc_core::hex::encode_hex;
use spandoc_core::ids::{SpanId, TraceId};
use spandoc_core::model::{self, Log, Process, Span, SpanRef, TagValue};
use tracing::{debug, warn};

const SERVICE_NAME_KEY: &str = "service.name";
const UNKNOWN_SERVICE: &str = "unknown_service";

pub fn decode_export(bytes: &[u8]) -> Result<Vec<Span>> {
    let request = ExportTraceServiceRequest::decode(bytes)
        .map_err(|e| SpandocError::Parse(format!("invalid OTLP trace export: {e}")))?;
    Ok(decode_request(&request))
}

pub fn decode_request(request: &ExportTraceServiceRequest) -> Vec<Span> {
    let mut out = Vec::new();
    for resource_spans in &request.resource_spans {
        let resource = resource_spans.resource.as_ref();
        for scope_spans in &resource_spans.scope_spans {
            let scope = scope_spans.scope.as_ref();
            out.extend(
                scope_spans
                    .spans
                    .iter()
                    .map(|span| decode_span(resource, scope, span)),
            );
        }
    }
    debug!(spans = out.len(), "decoded OTLP trace export");
    out
}

pub fn decode_span(
    resource: Option<&Resource>,
    scope: Option<&InstrumentationScope>,
    span: &OtlpSpan,
) -> Span {
    let trace_id = TraceId::from_bytes(&span.trace_id).unwrap_or_else(|| {
        warn!(len = span.trace_id.len(), "span has malformed trace id");
        TraceId::default()
    });
    let span_id = SpanId::from_bytes(&span.span_id).unwrap_or_else(|| {
        warn!(len = span.span_id.len(), "span has malformed span id");
        SpanId::default()
    });

    let mut references = Vec::with_capacity(span.links.len() + 1);
    if let Some(parent) = SpanId::from_bytes(&span.parent_span_id) {
        references.push(SpanRef::child_of(trace_id, parent));
    }
    references.extend(span.links.iter().filter_map(|link| {
        Some(SpanRef::follows_from(
            TraceId::from_bytes(&link.trace_id)?,
            SpanId::from_bytes(&link.span_id)?,
        ))
    }));

    let mut tags = kv_to_tags(&span.attributes);
    if let Some(kind) = span_kind_name(span.kind) {
        tags.push(model::KeyValue::string("span.kind", kind));
    }
    if let Some(scope) = scope {
        if !scope.name.is_empty() {
            tags.push(model::KeyValue::string("otel.scope.name", &scope.name));
        }
        if !scope.version.is_empty() {
            tags.push(model::KeyValue::string("otel.scope.version", &scope.version));
        }
    }
    if let Some(status) = &span.status {
        match status.code {
            1 => tags.push(model::KeyValue::string("otel.status_code", "OK")),
            2 => {
                tags.push(model::KeyValue::string("otel.status_code", "ERROR"));
                tags.push(model::KeyValue::bool("error", true));
            }
            _ => {}
        }
        if !status.message.is_empty() {
            tags.push(model::KeyValue::string(
                "otel.status_description",
                &status.message,
            ));
        }
    }

    let logs = span
        .events
        .iter()
        .map(|event| {
            let mut fields = Vec::with_capacity(event.attributes.len() + 1);
            if !event.name.is_empty() {
                fields.push(model::KeyValue::string("event", &event.name));
            }
            fields.extend(kv_to_tags(&event.attributes));
            Log {
                timestamp: nanos_to_dt(event.time_unix_nano),
                fields,
            }
        })
        .collect();

    Span {
        trace_id,
        span_id,
        parent_span_id: None,
        flags: span.flags & 0xff,
        operation_name: span.name.clone(),
        start_time: nanos_to_dt(span.start_time_unix_nano),
        duration: Duration::from_nanos(
            span.end_time_unix_nano
                .saturating_sub(span.start_time_unix_nano),
        ),
        tags,
        logs,
        process: decode_process(resource),
        references,
    }
}

fn decode_process(resource: Option<&Resource>) -> Process {
    let mut process = Process::new(UNKNOWN_SERVICE);
    let Some(resource) = resource else {
        return process;
    };
    for kv in &resource.attributes {
        if kv.key == SERVICE_NAME_KEY {
            process.service_name = any_value_to_string(kv.value.as_ref());
        } else {
            process.tags.push(decode_kv(kv));
        }
    }
    process
}

fn span_kind_name(kind: i32) -> Option<&'static str> {
    match kind {
        1 => Some("internal"),
        2 => Some("server"),
        3 => Some("client"),
        4 => Some("producer"),
        5 => Some("consumer"),
        _ => None,
    }
}

fn kv_to_tags(attrs: &[KeyValue]) -> Vec<model::KeyValue> {
    attrs.iter().map(decode_kv).collect()
}

fn decode_kv(kv: &KeyValue) -> model::KeyValue {
    let value = match kv.value.as_ref().and_then(|v| v.value.as_ref()) {
        Some(Value::StringValue(s)) => TagValue::String(s.clone()),
        Some(Value::BoolValue(b)) => TagValue::Bool(*b),
        Some(Value::IntValue(i)) => TagValue::Int64(*i),
        Some(Value::DoubleValue(d)) => TagValue::Float64(*d),
        Some(Value::BytesValue(b)) => TagValue::Binary(b.clone()),
        Some(other) => TagValue::String(value_to_json(other).to_string()),
        None => TagValue::String(String::new()),
    };
    model::KeyValue::new(kv.key.clone(), value)
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::StringValue(s) => serde_json::Value::String(s.clone()),
        Value::BoolValue(b) => serde_json::Value::Bool(*b),
        Value::IntValue(i) => serde_json::Value::from(*i),
        Value::DoubleValue(d) => serde_json::Number::from_f64(*d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::BytesValue(b) => serde_json::Value::String(encode_hex(b)),
        Value::ArrayValue(array) => serde_json::Value::Array(
            array
                .values
                .iter()
                .map(|v| v.value.as_ref().map(value_to_json).unwrap_or_default())
                .collect(),
        ),
        Value::KvlistValue(list) => serde_json::Value::Object(
            list.values
                .iter()
                .map(|kv| {
                    let v = kv
                        .value
                        .as_ref()
                        .and_then(|v| v.value.as_ref())
                        .map(value_to_json)
                        .unwrap_or_default();
                    (kv.key.clone(), v)
                })
                .collect(),
        ),
    }
}

fn any_value_to_string(value: Option<&AnyValue>) -> String {
    match value.and_then(|v| v.value.as_ref()) {
        Some(Value::StringValue(s)) => s.clone(),
        Some(other) => match value_to_json(other) {
            serde_json::Value::String(s) => s,
            json => json.to_string(),
        },
        None => String::new(),
    }
}

fn nanos_to_dt(nanos: u64) -> DateTime<Utc> {
    let secs = (nanos / 1_000_000_000) as i64;
    let subnanos = (nanos % 1_000_000_000) as u32;
    Utc.timestamp_opt(secs, subnanos)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
    use opentelemetry_proto::tonic::common::v1::any_value::Value;
    use opentelemetry_proto::tonic::common::v1::{
        AnyValue, ArrayValue, InstrumentationScope, KeyValue,
    };
    use opentelemetry_proto::tonic::resource::v1::Resource;
    use opentelemetry_proto::tonic::trace::v1::span::{Event, Link};
    use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span as OtlpSpan, Status};
    use prost::Message;
    use spandoc_core::model::{SpanRefType, TagValue};

    use super::{decode_export, decode_span};

    fn attr(key: &str, value: Value) -> KeyValue {
        KeyValue {
            key: key.into(),
            value: Some(AnyValue { value: Some(value) }),
        }
    }

    fn resource() -> Resource {
        Resource {
            attributes: vec![
                attr("service.name", Value::StringValue("api".into())),
                attr("host.name", Value::StringValue("box-1".into())),
            ],
            dropped_attributes_count: 0,
            entity_refs: vec![],
        }
    }

    fn otlp_span() -> OtlpSpan {
        OtlpSpan {
            trace_id: vec![1; 16],
            span_id: vec![2; 8],
            parent_span_id: vec![3; 8],
            name: "call".into(),
            kind: 3,
            flags: 0x301,
            start_time_unix_nano: 1_700_000_000_000_000_000,
            end_time_unix_nano: 1_700_000_000_100_000_000,
            attributes: vec![
                attr("http.status_code", Value::IntValue(200)),
                attr(
                    "tags",
                    Value::ArrayValue(ArrayValue {
                        values: vec![AnyValue {
                            value: Some(Value::StringValue("a".into())),
                        }],
                    }),
                ),
            ],
            events: vec![Event {
                time_unix_nano: 1_700_000_000_050_000_000,
                name: "retry".into(),
                attributes: vec![attr("attempt", Value::IntValue(2))],
                dropped_attributes_count: 0,
            }],
            links: vec![Link {
                trace_id: vec![4; 16],
                span_id: vec![5; 8],
                ..Default::default()
            }],
            status: Some(Status {
                message: "boom".into(),
                code: 2,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn decodes_ids_and_references() {
        let out = decode_span(None, None, &otlp_span());
        assert_eq!(out.trace_id.to_string(), "01010101010101010101010101010101");
        assert_eq!(out.span_id.to_string(), "0202020202020202");
        assert!(out.parent_span_id.is_none());
        assert_eq!(out.references.len(), 2);
        assert_eq!(out.references[0].ref_type, SpanRefType::ChildOf);
        assert_eq!(out.references[0].span_id.to_string(), "0303030303030303");
        assert_eq!(out.references[1].ref_type, SpanRefType::FollowsFrom);
        assert_eq!(out.flags, 1);
        assert_eq!(out.duration.as_millis(), 100);
    }

    #[test]
    fn decodes_tags_status_and_kind() {
        let scope = InstrumentationScope {
            name: "reqwest".into(),
            version: "0.12".into(),
            ..Default::default()
        };
        let out = decode_span(None, Some(&scope), &otlp_span());
        let tag = |key: &str| {
            out.tags
                .iter()
                .find(|kv| kv.key == key)
                .map(|kv| kv.value.clone())
        };
        assert_eq!(tag("http.status_code"), Some(TagValue::Int64(200)));
        assert_eq!(tag("tags"), Some(TagValue::String("[\"a\"]".into())));
        assert_eq!(tag("span.kind"), Some(TagValue::String("client".into())));
        assert_eq!(tag("otel.status_code"), Some(TagValue::String("ERROR".into())));
        assert_eq!(tag("error"), Some(TagValue::Bool(true)));
        assert_eq!(
            tag("otel.status_description"),
            Some(TagValue::String("boom".into()))
        );
        assert_eq!(tag("otel.scope.name"), Some(TagValue::String("reqwest".into())));
    }

    #[test]
    fn decodes_events_as_logs() {
        let out = decode_span(None, None, &otlp_span());
        assert_eq!(out.logs.len(), 1);
        assert_eq!(out.logs[0].fields[0].key, "event");
        assert_eq!(
            out.logs[0].fields[0].value,
            TagValue::String("retry".into())
        );
        assert_eq!(out.logs[0].fields[1].value, TagValue::Int64(2));
    }

    #[test]
    fn decodes_process_from_resource() {
        let out = decode_span(Some(&resource()), None, &otlp_span());
        assert_eq!(out.process.service_name, "api");
        assert_eq!(out.process.tags.len(), 1);
        assert_eq!(out.process.tags[0].key, "host.name");

        let bare = decode_span(None, None, &otlp_span());
        assert_eq!(bare.process.service_name, "unknown_service");
    }

    #[test]
    fn decodes_protobuf_export() -> anyhow::Result<()> {
        let request = ExportTraceServiceRequest {
            resource_spans: vec![ResourceSpans {
                resource: Some(resource()),
                scope_spans: vec![ScopeSpans {
                    spans: vec![otlp_span(), otlp_span()],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        };
        let spans = decode_export(&request.encode_to_vec())?;
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].process.service_name, "api");
        Ok(())
    }

    #[test]
    fn rejects_garbage_bytes() {
        assert!(decode_export(&[0xff, 0xff, 0xff]).is_err());
    }
}
