//! Tree replication onto head-inserting destinations

pub mod replicator;

pub use replicator::{ChildFactory, TreeReplicator};
