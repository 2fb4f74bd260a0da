//! Trace export data model
//!
//! One `TraceExport` is a decoded `ExportTraceServiceRequest`: the unit an
//! instrumented application submits to the collection backend. Exports are
//! immutable once decoded; queries borrow them and never mutate.

use serde::{Deserialize, Serialize};

use super::span::{KeyValue, Span};

/// One batch submission of resource/scope/span data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraceExport {
    /// Resource-span groups, in submission order
    pub resource_spans: Vec<ResourceSpans>,
}

/// Spans grouped under the resource that emitted them
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceSpans {
    /// The emitting resource
    pub resource: Resource,

    /// Scope-span groups, in submission order
    pub scope_spans: Vec<ScopeSpans>,

    /// Schema URL for the resource data
    pub schema_url: String,
}

/// Metadata describing the process/environment that emitted a set of spans
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    /// Resource attributes
    pub attributes: Vec<KeyValue>,

    /// Attributes dropped by the emitting SDK
    pub dropped_attributes_count: u32,
}

/// Spans sharing an instrumentation-scope identity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeSpans {
    /// The instrumentation scope; opaque to the query engine
    pub scope: InstrumentationScope,

    /// Spans, in submission order
    pub spans: Vec<Span>,

    /// Schema URL for the span data
    pub schema_url: String,
}

/// Identity of the instrumentation that produced a group of spans
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstrumentationScope {
    /// Scope name
    pub name: String,

    /// Scope version
    pub version: String,

    /// Scope attributes
    pub attributes: Vec<KeyValue>,

    /// Attributes dropped by the emitting SDK
    pub dropped_attributes_count: u32,
}
