//! Shape of the `result` payload of an envelope

use serde_json::{Map, Value};

/// The variants a `result` payload takes across methods.
///
/// The same method may answer with a bare list on one portal and a
/// keyed object on another, so callers match on the shape instead of
/// probing the JSON ad hoc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultShape<'a> {
    /// No `result` key at all.
    Missing,
    /// `result` present with a `null` value.
    Null,
    List(&'a [Value]),
    /// Object carrying the payload under `item`.
    Wrapped(&'a Value),
    Object(&'a Map<String, Value>),
    Scalar(&'a Value),
}

impl<'a> ResultShape<'a> {
    pub fn of(result: Option<&'a Value>) -> Self {
        match result {
            None => Self::Missing,
            Some(Value::Null) => Self::Null,
            Some(Value::Array(items)) => Self::List(items),
            Some(Value::Object(map)) => match map.get("item") {
                Some(item) => Self::Wrapped(item),
                None => Self::Object(map),
            },
            Some(scalar) => Self::Scalar(scalar),
        }
    }

    /// Classify the `result` field of an envelope.
    pub fn result_of(envelope: &'a Value) -> Self {
        Self::of(envelope.get("result"))
    }

    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::List(_) | Self::Wrapped(_) | Self::Object(_))
    }
}
