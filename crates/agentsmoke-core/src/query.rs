//! Span and attribute queries over decoded trace exports
//!
//! Pure, stateless functions over a borrowed batch. Flattening preserves
//! traversal order: exports, then resource-span groups, then scope-span
//! groups, then spans. Nothing is deduplicated; a duplicate attribute key
//! counts once per occurrence.

use crate::models::{KeyValue, Span, TraceExport};

/// Every span in the batch, flattened in traversal order.
pub fn spans(traces: &[TraceExport]) -> Vec<&Span> {
    traces
        .iter()
        .flat_map(|export| &export.resource_spans)
        .flat_map(|group| &group.scope_spans)
        .flat_map(|scope| &scope.spans)
        .collect()
}

/// Every attribute in the batch: all span attributes in span order, then
/// all resource attributes in trace/resource order.
pub fn attributes(traces: &[TraceExport]) -> Vec<&KeyValue> {
    let mut attrs: Vec<&KeyValue> = spans(traces)
        .into_iter()
        .flat_map(|span| &span.attributes)
        .collect();

    attrs.extend(
        traces
            .iter()
            .flat_map(|export| &export.resource_spans)
            .flat_map(|group| &group.resource.attributes),
    );

    attrs
}

/// Number of spans whose name exactly equals `name`.
pub fn count_spans_by_name(traces: &[TraceExport], name: &str) -> usize {
    spans(traces).iter().filter(|span| span.name == name).count()
}

/// Number of span and resource attributes whose key exactly equals `key`,
/// regardless of value kind.
pub fn count_by_attribute_key(traces: &[TraceExport], key: &str) -> usize {
    attributes(traces).iter().filter(|attr| attr.key == key).count()
}

/// Number of span and resource attributes whose key equals `key` and whose
/// value is string-typed and equals `value`.
///
/// Attributes with a matching key but a non-string value never match; the
/// backend assertions this engine serves only ever compare string values.
pub fn count_by_attribute_key_value(traces: &[TraceExport], key: &str, value: &str) -> usize {
    attributes(traces)
        .iter()
        .filter(|attr| attr.key == key && attr.string_value() == Some(value))
        .count()
}
