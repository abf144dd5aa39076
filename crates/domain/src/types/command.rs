//! Batch command model

use serde::{Deserialize, Serialize};

use super::Params;

/// One remote call addressed by a caller-chosen key.
///
/// Keys only correlate results back to inputs; the remote side attaches no
/// meaning to them beyond uniqueness inside one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub key: String,
    pub method: String,
    pub params: Params,
}

impl Command {
    pub fn new(key: impl Into<String>, method: impl Into<String>, params: Params) -> Self {
        Self { key: key.into(), method: method.into(), params }
    }

    /// Positional key in the `{prefix}_{n}` form, `n` starting at 1.
    pub fn positional_key(prefix: &str, index: usize) -> String {
        format!("{prefix}_{}", index + 1)
    }
}
