//! Data models for decoded OTLP trace exports

mod span;
mod trace;

pub use span::{
    AnyValue, ArrayValue, Int64, KeyValue, KeyValueList, Span, SpanEvent, SpanKind, SpanLink,
    SpanStatus, StatusCode,
};
pub use trace::{InstrumentationScope, Resource, ResourceSpans, ScopeSpans, TraceExport};
