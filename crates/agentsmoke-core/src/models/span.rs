//! Span data model
//!
//! Mirrors the protojson encoding of the OTLP trace schema: camelCase field
//! names, int64 rendered as a JSON string, enums rendered by value name.
//! Every field is optional on the wire; missing fields decode to defaults.

use serde::{Deserialize, Deserializer, Serialize};

/// A span represents a single operation within a trace
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Span {
    /// Trace ID (base64-encoded bytes, carried opaquely)
    pub trace_id: String,

    /// Span ID (base64-encoded bytes, carried opaquely)
    pub span_id: String,

    /// Parent span ID (empty for root spans)
    pub parent_span_id: String,

    /// Name of the operation
    pub name: String,

    /// Kind of span
    pub kind: SpanKind,

    /// When the operation started, in Unix nanoseconds
    pub start_time_unix_nano: Int64,

    /// When the operation ended, in Unix nanoseconds
    pub end_time_unix_nano: Int64,

    /// Span attributes
    pub attributes: Vec<KeyValue>,

    /// Attributes dropped by the emitting SDK
    pub dropped_attributes_count: u32,

    /// Events that occurred during the span
    pub events: Vec<SpanEvent>,

    /// Links to other spans
    pub links: Vec<SpanLink>,

    /// Status of the operation
    pub status: SpanStatus,
}

/// An event that occurred during a span
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpanEvent {
    /// When the event occurred, in Unix nanoseconds
    pub time_unix_nano: Int64,

    /// Event name
    pub name: String,

    /// Event attributes
    pub attributes: Vec<KeyValue>,

    /// Attributes dropped by the emitting SDK
    pub dropped_attributes_count: u32,
}

/// A link to another span
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpanLink {
    /// Trace ID of the linked span
    pub trace_id: String,

    /// Span ID of the linked span
    pub span_id: String,

    /// Link attributes
    pub attributes: Vec<KeyValue>,

    /// Attributes dropped by the emitting SDK
    pub dropped_attributes_count: u32,
}

/// Status of a span
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpanStatus {
    /// Status message (usually for errors)
    pub message: String,

    /// Status code
    pub code: StatusCode,
}

/// Kind of span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SpanKind {
    /// Kind not set
    #[default]
    #[serde(rename = "SPAN_KIND_UNSPECIFIED")]
    Unspecified,
    /// Internal operation
    #[serde(rename = "SPAN_KIND_INTERNAL")]
    Internal,
    /// Server-side operation
    #[serde(rename = "SPAN_KIND_SERVER")]
    Server,
    /// Client-side operation
    #[serde(rename = "SPAN_KIND_CLIENT")]
    Client,
    /// Producer in messaging
    #[serde(rename = "SPAN_KIND_PRODUCER")]
    Producer,
    /// Consumer in messaging
    #[serde(rename = "SPAN_KIND_CONSUMER")]
    Consumer,
}

impl<'de> Deserialize<'de> for SpanKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match EnumRepr::deserialize(deserializer)? {
            EnumRepr::Name(name) => match name.as_str() {
                "SPAN_KIND_UNSPECIFIED" => Ok(Self::Unspecified),
                "SPAN_KIND_INTERNAL" => Ok(Self::Internal),
                "SPAN_KIND_SERVER" => Ok(Self::Server),
                "SPAN_KIND_CLIENT" => Ok(Self::Client),
                "SPAN_KIND_PRODUCER" => Ok(Self::Producer),
                "SPAN_KIND_CONSUMER" => Ok(Self::Consumer),
                other => Err(serde::de::Error::custom(format!(
                    "unknown span kind: {other}"
                ))),
            },
            EnumRepr::Number(n) => match n {
                0 => Ok(Self::Unspecified),
                1 => Ok(Self::Internal),
                2 => Ok(Self::Server),
                3 => Ok(Self::Client),
                4 => Ok(Self::Producer),
                5 => Ok(Self::Consumer),
                other => Err(serde::de::Error::custom(format!(
                    "unknown span kind: {other}"
                ))),
            },
        }
    }
}

/// Status code of a span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum StatusCode {
    /// Status not set
    #[default]
    #[serde(rename = "STATUS_CODE_UNSET")]
    Unset,
    /// Operation completed successfully
    #[serde(rename = "STATUS_CODE_OK")]
    Ok,
    /// Operation failed
    #[serde(rename = "STATUS_CODE_ERROR")]
    Error,
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match EnumRepr::deserialize(deserializer)? {
            EnumRepr::Name(name) => match name.as_str() {
                "STATUS_CODE_UNSET" => Ok(Self::Unset),
                "STATUS_CODE_OK" => Ok(Self::Ok),
                "STATUS_CODE_ERROR" => Ok(Self::Error),
                other => Err(serde::de::Error::custom(format!(
                    "unknown status code: {other}"
                ))),
            },
            EnumRepr::Number(n) => match n {
                0 => Ok(Self::Unset),
                1 => Ok(Self::Ok),
                2 => Ok(Self::Error),
                other => Err(serde::de::Error::custom(format!(
                    "unknown status code: {other}"
                ))),
            },
        }
    }
}

/// protojson encodes proto enums either by value name or by number
#[derive(Deserialize)]
#[serde(untagged)]
enum EnumRepr {
    Name(String),
    Number(i64),
}

/// A typed key/value pair attached to a span or resource
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyValue {
    /// Attribute key; keys are not unique within an attribute set
    pub key: String,

    /// Attribute value; absent values are legal on the wire
    pub value: Option<AnyValue>,
}

impl KeyValue {
    /// Convenience constructor for a string-valued attribute
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(AnyValue::StringValue(value.into())),
        }
    }

    /// The attribute value, if it is string-typed.
    ///
    /// Equality queries only ever compare string values; every other value
    /// kind yields `None` here and never matches.
    pub fn string_value(&self) -> Option<&str> {
        match &self.value {
            Some(AnyValue::StringValue(s)) => Some(s),
            _ => None,
        }
    }
}

/// One of the value kinds an attribute may carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnyValue {
    /// UTF-8 string
    StringValue(String),
    /// Boolean
    BoolValue(bool),
    /// 64-bit integer
    IntValue(Int64),
    /// 64-bit float
    DoubleValue(f64),
    /// Homogeneous or heterogeneous list of values
    ArrayValue(ArrayValue),
    /// Nested key/value list
    KvlistValue(KeyValueList),
    /// Base64-encoded bytes
    BytesValue(String),
}

/// A list of attribute values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArrayValue {
    /// The values, in order
    pub values: Vec<AnyValue>,
}

/// A nested list of key/value pairs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyValueList {
    /// The pairs, in order
    pub values: Vec<KeyValue>,
}

/// A 64-bit integer in its protojson representation.
///
/// protojson renders int64 as a JSON string; encoders that skip the proto
/// mapping emit a plain number. Both forms are accepted on decode, and the
/// string form is produced on encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Int64(pub i64);

impl From<i64> for Int64 {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl Serialize for Int64 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Int64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(i64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(Self(n)),
            Repr::Text(s) => s.parse().map(Self).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int64_accepts_string_and_number() {
        let from_str: Int64 = serde_json::from_str("\"1681133178000000000\"").unwrap();
        let from_num: Int64 = serde_json::from_str("42").unwrap();
        assert_eq!(from_str, Int64(1_681_133_178_000_000_000));
        assert_eq!(from_num, Int64(42));
        assert_eq!(serde_json::to_string(&from_num).unwrap(), "\"42\"");
    }

    #[test]
    fn span_kind_accepts_name_and_number() {
        let by_name: SpanKind = serde_json::from_str("\"SPAN_KIND_SERVER\"").unwrap();
        let by_number: SpanKind = serde_json::from_str("2").unwrap();
        assert_eq!(by_name, SpanKind::Server);
        assert_eq!(by_number, SpanKind::Server);
    }

    #[test]
    fn any_value_is_externally_tagged() {
        let value: AnyValue = serde_json::from_str(r#"{"stringValue":"dev"}"#).unwrap();
        assert_eq!(value, AnyValue::StringValue("dev".to_string()));

        let value: AnyValue = serde_json::from_str(r#"{"intValue":"7"}"#).unwrap();
        assert_eq!(value, AnyValue::IntValue(Int64(7)));
    }

    #[test]
    fn string_value_ignores_other_kinds() {
        let text = KeyValue::string("lumigo.distro.version", "dev");
        assert_eq!(text.string_value(), Some("dev"));

        let number = KeyValue {
            key: "retries".to_string(),
            value: Some(AnyValue::IntValue(Int64(3))),
        };
        assert_eq!(number.string_value(), None);

        let absent = KeyValue {
            key: "empty".to_string(),
            value: None,
        };
        assert_eq!(absent.string_value(), None);
    }

    #[test]
    fn span_defaults_missing_fields() {
        let span: Span = serde_json::from_str(r#"{"name":"GET /greeting"}"#).unwrap();
        assert_eq!(span.name, "GET /greeting");
        assert!(span.attributes.is_empty());
        assert_eq!(span.kind, SpanKind::Unspecified);
        assert_eq!(span.status.code, StatusCode::Unset);
    }
}
