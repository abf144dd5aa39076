//! Chunked batch execution
//!
//! The remote `batch` endpoint caps the number of sub-commands per call, so
//! a logical unit of work is split into consecutive chunks. A chunk that
//! reports any per-command error fails the whole operation; nothing of the
//! partial result is returned.

use std::collections::HashSet;

use b24rest_domain::{Command, Params, RestError, Result};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::context::{is_blank, RestContext};
use crate::response::extract_by_path;

/// Command key to raw result, in submission order.
pub type BatchResults = IndexMap<String, Value>;

/// Ordered commands with unique keys.
#[derive(Debug, Clone, Default)]
pub struct CommandSet {
    commands: Vec<Command>,
    keys: HashSet<String>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command.
    ///
    /// # Errors
    /// `RestError::InvalidInput` when the key is already present.
    pub fn push(&mut self, command: Command) -> Result<()> {
        if !self.keys.insert(command.key.clone()) {
            return Err(RestError::InvalidInput(format!(
                "duplicate batch command key `{}`",
                command.key
            )));
        }
        self.commands.push(command);
        Ok(())
    }

    /// Build a set from commands, rejecting duplicate keys.
    pub fn try_from_iter(commands: impl IntoIterator<Item = Command>) -> Result<Self> {
        let mut set = Self::new();
        for command in commands {
            set.push(command)?;
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn as_slice(&self) -> &[Command] {
        &self.commands
    }
}

/// Splits command sets into batch calls and merges their results.
#[derive(Debug, Clone)]
pub struct BatchMultiplexer {
    context: RestContext,
}

impl BatchMultiplexer {
    pub const fn new(context: RestContext) -> Self {
        Self { context }
    }

    /// Execute every command, one batch call per chunk of `batch_size`.
    ///
    /// Keys absent from a successful chunk's result are omitted from the
    /// returned map.
    ///
    /// # Errors
    /// `RestError::BatchChunkFailure` when a chunk reports per-command
    /// errors, plus any error of the underlying call.
    #[instrument(skip(self, commands), fields(commands = commands.len()))]
    pub async fn execute(&self, commands: &CommandSet, halt: bool) -> Result<BatchResults> {
        let mut merged = BatchResults::with_capacity(commands.len());
        if commands.is_empty() {
            return Ok(merged);
        }

        let batch_size = self.context.settings().batch_size.max(1);
        for (index, chunk) in commands.as_slice().chunks(batch_size).enumerate() {
            let chunk_number = index + 1;
            debug!(chunk = chunk_number, size = chunk.len(), "submitting batch chunk");

            let envelope = self.context.call_batch(chunk, halt).await?;
            let errors = extract_by_path(&envelope, &["result", "result_error"]);
            if let Some(errors) = errors.filter(|value| !is_blank(value)) {
                let failed_keys = failed_keys(errors);
                warn!(chunk = chunk_number, failed = ?failed_keys, "batch chunk reported errors");
                return Err(RestError::BatchChunkFailure {
                    chunk: chunk_number,
                    failed_keys,
                    envelope,
                });
            }

            let results = extract_by_path(&envelope, &["result", "result"]);
            for command in chunk {
                match lookup(results, &command.key) {
                    Some(value) => {
                        merged.insert(command.key.clone(), value.clone());
                    }
                    None => warn!(key = %command.key, "batch result missing for command"),
                }
            }
        }

        info!(results = merged.len(), "batch completed");
        Ok(merged)
    }

    /// Run `method` once per item and return results positionally.
    ///
    /// Keys are `{key_prefix}_{n}` counting from one; `None` marks an item
    /// whose result was absent.
    pub async fn bulk(
        &self,
        method: &str,
        items: Vec<Params>,
        key_prefix: &str,
    ) -> Result<Vec<Option<Value>>> {
        let keys: Vec<String> =
            (0..items.len()).map(|index| Command::positional_key(key_prefix, index)).collect();
        let commands = CommandSet::try_from_iter(
            keys.iter().zip(items).map(|(key, params)| Command::new(key.clone(), method, params)),
        )?;

        let mut results = self.execute(&commands, false).await?;
        Ok(keys.iter().map(|key| results.swap_remove(key)).collect())
    }
}

/// Batch results arrive as an object, or as a list when the keys were
/// positional.
fn lookup<'a>(results: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    match results? {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|index| items.get(index)),
        _ => None,
    }
}

fn failed_keys(errors: &Value) -> Vec<String> {
    match errors {
        Value::Object(map) => map.keys().cloned().collect(),
        Value::Array(items) => (0..items.len()).map(|index| index.to_string()).collect(),
        other => vec![other.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Map};

    use super::*;
    use crate::context::RestSettings;
    use crate::transport_ports::RestTransport;

    /// Echoes every command key back, optionally failing one key.
    #[derive(Default)]
    struct EchoTransport {
        fail_key: Option<String>,
        chunks: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl RestTransport for EchoTransport {
        async fn call(&self, _method: &str, _params: &Params) -> Result<Value> {
            Ok(json!({"result": null}))
        }

        async fn call_batch(&self, commands: &[Command], _halt: bool) -> Result<Value> {
            let keys: Vec<String> = commands.iter().map(|c| c.key.clone()).collect();
            self.chunks.lock().unwrap().push(keys.clone());

            let mut result = Map::new();
            let mut errors = Map::new();
            for key in keys {
                if self.fail_key.as_deref() == Some(key.as_str()) {
                    errors.insert(key, json!({"error": "ACCESS_DENIED"}));
                } else {
                    result.insert(key.clone(), json!({"echo": key}));
                }
            }
            Ok(json!({"result": {"result": result, "result_error": if errors.is_empty() {
                json!([])
            } else {
                Value::Object(errors)
            }}}))
        }
    }

    fn multiplexer(transport: Arc<EchoTransport>, batch_size: usize) -> BatchMultiplexer {
        let settings = RestSettings { batch_size, ..RestSettings::default() };
        BatchMultiplexer::new(RestContext::new(transport).with_settings(settings))
    }

    fn commands(count: usize) -> CommandSet {
        CommandSet::try_from_iter((0..count).map(|index| {
            Command::new(Command::positional_key("add", index), "crm.item.add", Params::new())
        }))
        .unwrap()
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut set = CommandSet::new();
        set.push(Command::new("a", "m", Params::new())).unwrap();
        let err = set.push(Command::new("a", "m", Params::new())).unwrap_err();
        assert!(matches!(err, RestError::InvalidInput(_)));
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn empty_set_makes_no_call() {
        let transport = Arc::new(EchoTransport::default());
        let results = multiplexer(transport.clone(), 50).execute(&CommandSet::new(), false).await;
        assert!(results.unwrap().is_empty());
        assert!(transport.chunks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn results_keep_submission_order() {
        let transport = Arc::new(EchoTransport::default());
        let results = multiplexer(transport.clone(), 2).execute(&commands(5), false).await.unwrap();

        let keys: Vec<&str> = results.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["add_1", "add_2", "add_3", "add_4", "add_5"]);
        assert_eq!(transport.chunks.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn failing_chunk_reports_its_keys() {
        let transport =
            Arc::new(EchoTransport { fail_key: Some("add_3".into()), ..Default::default() });
        let err = multiplexer(transport, 2).execute(&commands(4), false).await.unwrap_err();

        match err {
            RestError::BatchChunkFailure { chunk, failed_keys, .. } => {
                assert_eq!(chunk, 2);
                assert_eq!(failed_keys, vec!["add_3".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn bulk_returns_results_positionally() {
        let transport = Arc::new(EchoTransport::default());
        let results = multiplexer(transport, 50)
            .bulk("crm.item.add", vec![Params::new(), Params::new()], "add")
            .await
            .unwrap();

        assert_eq!(results, vec![Some(json!({"echo": "add_1"})), Some(json!({"echo": "add_2"}))]);
    }

    #[test]
    fn list_shaped_results_are_indexed() {
        let results = json!(["zero", "one"]);
        assert_eq!(lookup(Some(&results), "1"), Some(&json!("one")));
        assert_eq!(lookup(Some(&results), "x"), None);
    }
}
