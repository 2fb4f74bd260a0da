//! Trace export decoding
//!
//! The backend stores every export request it received as an opaque JSON
//! blob and serves them back as one JSON array. Decoding is all-or-nothing:
//! a single malformed blob discards the whole batch and reports the failing
//! index, so an assertion never runs against a partially decoded batch.

use serde_json::value::RawValue;

use crate::error::{Error, Result};
use crate::models::TraceExport;

/// Decode a backend response body: a JSON array of raw export blobs.
pub fn decode_body(body: &str) -> Result<Vec<TraceExport>> {
    let raw: Vec<&RawValue> = serde_json::from_str(body)?;
    decode_blobs(raw.iter().map(|blob| blob.get()))
}

/// Decode a sequence of JSON blobs, each one serialized
/// `ExportTraceServiceRequest`, preserving input order.
pub fn decode_blobs<'a>(blobs: impl IntoIterator<Item = &'a str>) -> Result<Vec<TraceExport>> {
    blobs
        .into_iter()
        .enumerate()
        .map(|(index, blob)| {
            serde_json::from_str(blob).map_err(|source| Error::decode(index, source))
        })
        .collect()
}
