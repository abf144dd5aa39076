//! Source and destination nodes of a tree replication

use serde::{Deserialize, Serialize};

/// Flat source node; `parent_id == 0` marks a root child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub source_id: i64,
    pub parent_id: i64,
    pub title: String,
    pub sort_index: i64,
}

impl TreeNode {
    pub fn new(source_id: i64, parent_id: i64, title: impl Into<String>, sort_index: i64) -> Self {
        Self { source_id, parent_id, title: title.into(), sort_index }
    }
}

/// Audit record of one node created at the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedNode {
    pub source_id: i64,
    pub created_id: i64,
    /// Destination-space parent id.
    pub parent_id: i64,
    pub title: String,
}
