//! Shared test helpers for `b24rest-core` integration tests.
//!
//! In-memory transports stand in for the webhook so the algorithms can be
//! driven with exact, scripted envelopes.

#![allow(dead_code)]

pub mod transport;

use std::sync::Arc;

use b24rest_core::{RestContext, RestSettings, RestTransport};
use b24rest_domain::{Params, Record};
use serde_json::Value;

/// Context over `transport` with the given page and batch sizes.
pub fn context(transport: Arc<dyn RestTransport>, page_size: usize, batch_size: usize) -> RestContext {
    let settings = RestSettings { page_size, batch_size, ..RestSettings::default() };
    RestContext::new(transport).with_settings(settings)
}

/// Parse a JSON object literal into params.
pub fn params(value: Value) -> Params {
    value.as_object().cloned().expect("params must be a JSON object")
}

/// Records with the given `ID` values.
pub fn id_records(ids: &[i64]) -> Vec<Value> {
    ids.iter().map(|id| serde_json::json!({ "ID": id.to_string() })).collect()
}

pub fn ids_of(records: &[Record], field: &str) -> Vec<i64> {
    records
        .iter()
        .filter_map(|record| record.get(field))
        .filter_map(|value| match value {
            Value::String(text) => text.parse().ok(),
            other => other.as_i64(),
        })
        .collect()
}
