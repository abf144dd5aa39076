//! Port interface for the remote call transport

use async_trait::async_trait;
use b24rest_domain::{Command, Params, Result};
use serde_json::Value;

/// Trait for issuing raw calls against the remote REST API
///
/// Implementations return the decoded envelope untouched. Interpreting the
/// `error` field is left to [`crate::RestContext`].
#[async_trait]
pub trait RestTransport: Send + Sync {
    /// Issue a single method call
    async fn call(&self, method: &str, params: &Params) -> Result<Value>;

    /// Issue one batch call carrying `commands` in order
    async fn call_batch(&self, commands: &[Command], halt: bool) -> Result<Value>;
}
