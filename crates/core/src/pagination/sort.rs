//! Client-side multi-key record sort

use std::cmp::Ordering;

use b24rest_domain::{Record, SortDirection, SortKey};
use serde_json::Value;

/// Total order over loosely typed field values.
///
/// Missing and `null` sort first. Two numeric-looking values compare as
/// numbers, so `"9"` precedes `"10"`; every other pair compares as text.
pub fn compare_sort_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let left = left.filter(|value| !value.is_null());
    let right = right.filter(|value| !value.is_null());

    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => match (as_number(left), as_number(right)) {
            (Some(l), Some(r)) => l.total_cmp(&r),
            _ => as_text(left).cmp(&as_text(right)),
        },
    }
}

/// Stable sort by `keys` in priority order.
pub fn sort_records(records: &mut [Record], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }

    records.sort_by(|left, right| {
        keys.iter()
            .map(|key| {
                let ordering = compare_sort_values(left.get(&key.field), right.get(&key.field));
                match key.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let text = text.trim();
            let numeric_chars = !text.is_empty()
                && text.bytes().all(|byte| byte.is_ascii_digit() || b"+-.eE".contains(&byte));
            if numeric_chars {
                text.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        other => other.to_string(),
    }
}
