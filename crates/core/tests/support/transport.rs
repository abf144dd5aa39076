//! Mock transports
//!
//! - [`ScriptedTransport`] replays queued envelopes and records every call.
//! - [`EchoBatchTransport`] answers batch calls key by key and can fail a
//!   chosen chunk.
//! - [`HeadInsertStore`] behaves like a checklist that always inserts new
//!   children at the top of their parent.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use b24rest_core::RestTransport;
use b24rest_domain::{Command, Params, Result};
use serde_json::{json, Map, Value};

/// One call seen by a mock transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Call { method: String, params: Params },
    Batch { commands: Vec<Command>, halt: bool },
}

impl RecordedCall {
    pub fn params(&self) -> Option<&Params> {
        match self {
            Self::Call { params, .. } => Some(params),
            Self::Batch { .. } => None,
        }
    }
}

/// Replays envelopes in order; an exhausted script answers `{"result": []}`.
#[derive(Default)]
pub struct ScriptedTransport {
    envelopes: Mutex<VecDeque<Value>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new(envelopes: Vec<Value>) -> Self {
        Self { envelopes: Mutex::new(envelopes.into()), calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_envelope(&self) -> Value {
        self.envelopes.lock().unwrap().pop_front().unwrap_or_else(|| json!({"result": []}))
    }
}

#[async_trait]
impl RestTransport for ScriptedTransport {
    async fn call(&self, method: &str, params: &Params) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::Call { method: method.to_string(), params: params.clone() });
        Ok(self.next_envelope())
    }

    async fn call_batch(&self, commands: &[Command], halt: bool) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall::Batch { commands: commands.to_vec(), halt });
        Ok(self.next_envelope())
    }
}

/// Answers each batch command with `"{key}-ok"`.
#[derive(Default)]
pub struct EchoBatchTransport {
    /// 1-based chunk whose first command reports an error.
    pub fail_chunk: Option<usize>,
    chunks: Mutex<Vec<Vec<String>>>,
}

impl EchoBatchTransport {
    pub fn failing_chunk(chunk: usize) -> Self {
        Self { fail_chunk: Some(chunk), ..Self::default() }
    }

    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.chunks.lock().unwrap().iter().map(Vec::len).collect()
    }
}

#[async_trait]
impl RestTransport for EchoBatchTransport {
    async fn call(&self, method: &str, _params: &Params) -> Result<Value> {
        panic!("unexpected single call to {method}")
    }

    async fn call_batch(&self, commands: &[Command], _halt: bool) -> Result<Value> {
        let mut chunks = self.chunks.lock().unwrap();
        chunks.push(commands.iter().map(|command| command.key.clone()).collect());
        let failing = self.fail_chunk == Some(chunks.len());

        let mut result = Map::new();
        let mut errors = Map::new();
        for (index, command) in commands.iter().enumerate() {
            if failing && index == 0 {
                errors.insert(
                    command.key.clone(),
                    json!({"error": "ERROR_CORE", "error_description": "rejected"}),
                );
            } else {
                result.insert(command.key.clone(), json!(format!("{}-ok", command.key)));
            }
        }

        let result_error = if errors.is_empty() { json!([]) } else { Value::Object(errors) };
        Ok(json!({"result": {"result": result, "result_error": result_error}}))
    }
}

/// Destination store whose create primitive inserts at the head of the
/// parent's children.
#[derive(Default)]
pub struct HeadInsertStore {
    /// 1-based batch whose commands are all rejected.
    pub fail_batch: Option<usize>,
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    next_id: i64,
    children: HashMap<i64, Vec<i64>>,
    titles: HashMap<i64, String>,
    batches: usize,
}

impl HeadInsertStore {
    pub fn failing_batch(batch: usize) -> Self {
        Self { fail_batch: Some(batch), ..Self::default() }
    }

    /// Titles under `parent_id` in display order.
    pub fn children_titles(&self, parent_id: i64) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .children
            .get(&parent_id)
            .map(|ids| ids.iter().map(|id| state.titles[id].clone()).collect())
            .unwrap_or_default()
    }

    pub fn id_of(&self, title: &str) -> Option<i64> {
        let state = self.state.lock().unwrap();
        state.titles.iter().find(|(_, t)| t.as_str() == title).map(|(id, _)| *id)
    }

    pub fn batch_count(&self) -> usize {
        self.state.lock().unwrap().batches
    }
}

#[async_trait]
impl RestTransport for HeadInsertStore {
    async fn call(&self, method: &str, _params: &Params) -> Result<Value> {
        panic!("unexpected single call to {method}")
    }

    async fn call_batch(&self, commands: &[Command], _halt: bool) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        state.batches += 1;

        if self.fail_batch == Some(state.batches) {
            let errors: Map<String, Value> = commands
                .iter()
                .map(|command| (command.key.clone(), json!({"error": "ACCESS_DENIED"})))
                .collect();
            return Ok(json!({"result": {"result": [], "result_error": errors}}));
        }

        let mut result = Map::new();
        for command in commands {
            let fields = &command.params["fields"];
            let parent = fields["PARENT_ID"].as_i64().unwrap_or_default();
            let title = fields["TITLE"].as_str().unwrap_or_default().to_string();

            state.next_id += 1;
            let id = state.next_id;
            state.children.entry(parent).or_default().insert(0, id);
            state.titles.insert(id, title);
            result.insert(command.key.clone(), json!(id));
        }

        Ok(json!({"result": {"result": result, "result_error": []}}))
    }
}
