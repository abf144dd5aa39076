//! Permissive extraction of typed payloads from response envelopes
//!
//! Envelopes are read, never validated: a value of the wrong shape yields
//! `None`, `false` or an empty list and the caller decides whether that is
//! an error.

use b24rest_domain::constants::{DEFAULT_LIST_KEYS, TRUTHY_STRINGS};
use b24rest_domain::{ListResponse, Record};
use serde_json::Value;

use super::shape::ResultShape;

/// Records of a list call.
///
/// A list-shaped `result` is returned as is. Otherwise the caller's
/// candidate keys are tried in order, then the default key set; the first
/// list-shaped value wins. Non-object entries are dropped.
pub fn extract_list(envelope: &Value, candidates: &[&str]) -> Vec<Record> {
    let items = match ResultShape::result_of(envelope) {
        ResultShape::List(items) => Some(items),
        ResultShape::Object(map) => candidates
            .iter()
            .chain(DEFAULT_LIST_KEYS.iter())
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice),
        ResultShape::Missing
        | ResultShape::Null
        | ResultShape::Wrapped(_)
        | ResultShape::Scalar(_) => None,
    };

    items
        .unwrap_or_default()
        .iter()
        .filter_map(|item| item.as_object().cloned())
        .collect()
}

/// Items plus the `next`/`total` hints of one list call.
pub fn extract_list_response(envelope: &Value, candidates: &[&str]) -> ListResponse {
    ListResponse {
        items: extract_list(envelope, candidates),
        next: extract_next(envelope),
        total: extract_total(envelope),
    }
}

/// Walk object keys from the envelope root.
pub fn extract_by_path<'a>(envelope: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(envelope, |value, key| value.get(*key))
}

/// Integers pass through, digit-only strings are parsed, anything else is
/// `None`.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => {
            let text = text.trim();
            let digits = text.strip_prefix('-').unwrap_or(text);
            if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
                return None;
            }
            text.parse().ok()
        }
        _ => None,
    }
}

/// Loose truthiness: positive numbers and `1`/`true`/`y`/`yes` strings.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n > 0.0),
        Value::String(text) => {
            let text = text.trim().to_lowercase();
            TRUTHY_STRINGS.contains(&text.as_str())
        }
        _ => false,
    }
}

/// Positive scalar id held directly in `result`.
pub fn extract_scalar_id(envelope: &Value) -> Option<i64> {
    match ResultShape::result_of(envelope) {
        ResultShape::Scalar(value) => coerce_int(value).filter(|id| *id > 0),
        _ => None,
    }
}

/// Id of a freshly created entity, from a bare value, an object with
/// `id`/`ID` or an `{ item: ... }` wrapper.
pub fn extract_created_id(value: &Value) -> Option<String> {
    match ResultShape::of(Some(value)) {
        ResultShape::Scalar(scalar) => scalar_to_string(scalar),
        ResultShape::Wrapped(item) => extract_created_id(item),
        ResultShape::Object(map) => {
            map.get("id").or_else(|| map.get("ID")).and_then(scalar_to_string)
        }
        ResultShape::Missing | ResultShape::Null | ResultShape::List(_) => None,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Outcome of a delete/update style call.
///
/// Methods answer with a boolean, a numeric code, an echoed object or a
/// bare `null`. A present `null` and any structured payload count as
/// success; scalars go through [`coerce_bool`]; a missing `result` is
/// failure.
pub fn extract_acknowledgement(envelope: &Value) -> bool {
    acknowledge(envelope.get("result"))
}

/// [`extract_acknowledgement`] for a bare result value, as found in batch
/// results.
pub fn acknowledge(result: Option<&Value>) -> bool {
    match ResultShape::of(result) {
        ResultShape::Null
        | ResultShape::List(_)
        | ResultShape::Wrapped(_)
        | ResultShape::Object(_) => true,
        ResultShape::Scalar(value) => coerce_bool(value),
        ResultShape::Missing => false,
    }
}

/// Boolean held directly in `result`; structured payloads are not truthy.
pub fn extract_boolean(envelope: &Value) -> bool {
    match ResultShape::result_of(envelope) {
        ResultShape::Scalar(value) => coerce_bool(value),
        _ => false,
    }
}

pub fn extract_next(envelope: &Value) -> Option<i64> {
    envelope.get("next").and_then(coerce_int)
}

pub fn extract_total(envelope: &Value) -> Option<i64> {
    envelope.get("total").and_then(coerce_int)
}
