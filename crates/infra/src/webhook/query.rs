//! Bracket-style query encoding for batch command strings
//!
//! Nested objects and arrays flatten to `outer[inner]=value` pairs the way
//! the portal parses them: list positions become `[0]`, `[1]`, booleans
//! become `1`/`0`, and `null` values are dropped.

use serde_json::{Map, Value};
use urlencoding::encode;

/// Encode `params` into one `key=value&...` string.
pub fn build_query(params: &Map<String, Value>) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        push_pairs(&mut pairs, key.clone(), value);
    }
    pairs.join("&")
}

fn push_pairs(pairs: &mut Vec<String>, prefix: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => pairs.push(pair(&prefix, if *flag { "1" } else { "0" })),
        Value::Number(number) => pairs.push(pair(&prefix, &number.to_string())),
        Value::String(text) => pairs.push(pair(&prefix, text)),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_pairs(pairs, format!("{prefix}[{index}]"), item);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                push_pairs(pairs, format!("{prefix}[{key}]"), item);
            }
        }
    }
}

fn pair(key: &str, value: &str) -> String {
    format!("{}={}", encode(key), encode(value))
}
