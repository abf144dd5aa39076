//! Order-preserving tree copy onto a head-inserting destination
//!
//! The destination only offers "create child under parent", and every new
//! child lands before its existing siblings. Each sibling group is
//! therefore created in reverse, as one batch, so the final left-to-right
//! order matches the source once the group completes. Subtrees are then
//! visited in source order using the freshly created ids as parents.
//!
//! Nothing is rolled back on failure: groups created before the failing
//! batch stay at the destination.

use std::collections::{HashMap, HashSet};

use b24rest_domain::{Command, CreatedNode, Params, RestError, Result, TreeNode};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::batch::{BatchMultiplexer, CommandSet};
use crate::response::{coerce_int, extract_created_id};

/// Destination primitive that creates one child under a parent.
pub trait ChildFactory: Send + Sync {
    /// Method and params creating `title` under `parent_id`.
    fn create_command(&self, parent_id: i64, title: &str) -> (String, Params);

    /// Destination id from one command's raw batch result.
    fn created_id(&self, result: &Value) -> Option<i64> {
        extract_created_id(result)
            .and_then(|id| coerce_int(&Value::String(id)))
            .filter(|id| *id > 0)
    }

    /// Prefix of the batch command keys.
    fn key_prefix(&self) -> &str {
        "tree_add"
    }
}

/// Replicates flat source trees through a [`ChildFactory`].
#[derive(Debug, Clone)]
pub struct TreeReplicator {
    batches: BatchMultiplexer,
}

impl TreeReplicator {
    pub const fn new(batches: BatchMultiplexer) -> Self {
        Self { batches }
    }

    /// Copy `source` under the destination root, returning every created
    /// node in creation order.
    ///
    /// Nodes with a non-positive id or a blank title are skipped; a node
    /// whose parent is missing from `source` is attached to the root.
    ///
    /// # Errors
    /// Any batch error aborts the copy. `RestError::InvalidResponse` when a
    /// successful batch carries no usable id for a created node.
    #[instrument(skip(self, source, factory), fields(nodes = source.len()))]
    pub async fn replicate(
        &self,
        source: &[TreeNode],
        factory: &dyn ChildFactory,
    ) -> Result<Vec<CreatedNode>> {
        let children = build_children(source);
        let mut created = Vec::new();
        let mut visited = HashSet::new();
        let mut worklist: Vec<(i64, i64)> = vec![(0, 0)];

        while let Some((source_parent, destination_parent)) = worklist.pop() {
            let Some(siblings) = children.get(&source_parent) else {
                continue;
            };

            let group: Vec<&TreeNode> =
                siblings.iter().copied().filter(|node| visited.insert(node.source_id)).collect();
            if group.is_empty() {
                continue;
            }

            let group_created = self.create_group(&group, destination_parent, factory).await?;

            // Creation order is reversed source order, so subtrees pop in
            // source order.
            for node in &group_created {
                worklist.push((node.source_id, node.created_id));
            }
            created.extend(group_created);
        }

        let total = children.values().map(Vec::len).sum::<usize>();
        if visited.len() < total {
            warn!(skipped = total - visited.len(), "source nodes unreachable from the root");
        }

        info!(created = created.len(), "tree replicated");
        Ok(created)
    }

    /// Create one sibling group in reverse, returned in submission order.
    async fn create_group(
        &self,
        group: &[&TreeNode],
        destination_parent: i64,
        factory: &dyn ChildFactory,
    ) -> Result<Vec<CreatedNode>> {
        let prefix = factory.key_prefix();
        let reversed: Vec<&TreeNode> = group.iter().rev().copied().collect();

        let mut commands = CommandSet::new();
        for (index, node) in reversed.iter().enumerate() {
            let (method, params) = factory.create_command(destination_parent, &node.title);
            commands.push(Command::new(Command::positional_key(prefix, index), method, params))?;
        }

        debug!(parent = destination_parent, size = reversed.len(), "creating sibling group");
        let results = self.batches.execute(&commands, false).await?;

        let mut created = Vec::with_capacity(reversed.len());
        for (index, node) in reversed.iter().enumerate() {
            let key = Command::positional_key(prefix, index);
            let created_id = results.get(&key).and_then(|result| factory.created_id(result));
            let Some(created_id) = created_id else {
                return Err(RestError::InvalidResponse(format!(
                    "no created id for source node {} (command `{key}`)",
                    node.source_id
                )));
            };

            created.push(CreatedNode {
                source_id: node.source_id,
                created_id,
                parent_id: destination_parent,
                title: node.title.clone(),
            });
        }

        Ok(created)
    }
}

/// Parent to children map, children ordered by `(sort_index, source_id)`.
fn build_children(source: &[TreeNode]) -> HashMap<i64, Vec<&TreeNode>> {
    let mut by_id: HashMap<i64, &TreeNode> = HashMap::new();
    for node in source {
        if node.source_id <= 0 || node.title.trim().is_empty() {
            warn!(source_id = node.source_id, "skipping source node without id or title");
            continue;
        }
        by_id.insert(node.source_id, node);
    }

    let mut children: HashMap<i64, Vec<&TreeNode>> = HashMap::new();
    for node in by_id.values().copied() {
        let parent = if node.parent_id > 0 && by_id.contains_key(&node.parent_id) {
            node.parent_id
        } else {
            0
        };
        children.entry(parent).or_default().push(node);
    }

    for siblings in children.values_mut() {
        siblings.sort_by_key(|node| (node.sort_index, node.source_id));
    }
    children
}
