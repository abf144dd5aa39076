//! Injected call context shared by every algorithm and service

use std::fmt;
use std::sync::Arc;

use b24rest_domain::constants::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_ITERATIONS, DEFAULT_PAGE_SIZE};
use b24rest_domain::{ClientConfig, Command, Params, RestError, Result};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::transport_ports::RestTransport;

/// Runtime limits applied by the batch and pagination algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestSettings {
    pub batch_size: usize,
    pub page_size: usize,
    pub max_iterations: usize,
}

impl Default for RestSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl From<&ClientConfig> for RestSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            page_size: config.page_size.max(1),
            max_iterations: config.max_iterations.max(1),
        }
    }
}

/// Transport handle plus limits, cloned into every component that calls out.
#[derive(Clone)]
pub struct RestContext {
    transport: Arc<dyn RestTransport>,
    settings: RestSettings,
}

impl RestContext {
    /// Create a context with default limits
    pub fn new(transport: Arc<dyn RestTransport>) -> Self {
        Self { transport, settings: RestSettings::default() }
    }

    pub fn with_settings(mut self, settings: RestSettings) -> Self {
        self.settings = settings;
        self
    }

    pub const fn settings(&self) -> RestSettings {
        self.settings
    }

    /// Call `method` and fail on an error envelope.
    ///
    /// # Errors
    /// `RestError::RemoteCall` when the envelope carries a non-empty `error`,
    /// `RestError::InvalidResponse` when it is not a JSON object, and any
    /// transport error unchanged.
    #[instrument(skip(self, params), fields(method = %method))]
    pub async fn call(&self, method: &str, params: &Params) -> Result<Value> {
        debug!("calling remote method");
        let envelope = self.transport.call(method, params).await?;
        check_envelope(method, envelope)
    }

    /// Submit one batch call and fail on an error envelope.
    ///
    /// Per-command errors inside the envelope are not inspected here.
    #[instrument(skip(self, commands), fields(commands = commands.len()))]
    pub async fn call_batch(&self, commands: &[Command], halt: bool) -> Result<Value> {
        let envelope = self.transport.call_batch(commands, halt).await?;
        check_envelope("batch", envelope)
    }
}

impl fmt::Debug for RestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestContext").field("settings", &self.settings).finish_non_exhaustive()
    }
}

fn check_envelope(method: &str, envelope: Value) -> Result<Value> {
    let Some(object) = envelope.as_object() else {
        return Err(RestError::InvalidResponse(format!(
            "method `{method}` returned a non-object envelope"
        )));
    };

    let Some(code) = object.get("error").filter(|value| !is_blank(value)) else {
        return Ok(envelope);
    };

    let message = ["error_description", "error_information"]
        .iter()
        .find_map(|key| object.get(*key).filter(|value| !value.is_null()))
        .unwrap_or(code);
    let message = match message {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };

    Err(RestError::RemoteCall { method: method.to_string(), message, envelope })
}

/// Blank in the loose sense the remote API uses for "no error".
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    struct FixedTransport {
        envelope: Value,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RestTransport for FixedTransport {
        async fn call(&self, method: &str, _params: &Params) -> Result<Value> {
            self.calls.lock().unwrap().push(method.to_string());
            Ok(self.envelope.clone())
        }

        async fn call_batch(&self, _commands: &[Command], _halt: bool) -> Result<Value> {
            self.calls.lock().unwrap().push("batch".to_string());
            Ok(self.envelope.clone())
        }
    }

    fn context(envelope: Value) -> RestContext {
        RestContext::new(Arc::new(FixedTransport { envelope, calls: Mutex::new(Vec::new()) }))
    }

    #[tokio::test]
    async fn passes_successful_envelope_through() {
        let ctx = context(json!({"result": [1, 2], "error": ""}));
        let envelope = ctx.call("crm.item.list", &Params::new()).await.unwrap();
        assert_eq!(envelope["result"], json!([1, 2]));
    }

    #[tokio::test]
    async fn error_envelope_becomes_remote_call_failure() {
        let ctx = context(json!({
            "error": "ACCESS_DENIED",
            "error_description": "Access denied."
        }));
        match ctx.call("crm.item.list", &Params::new()).await {
            Err(RestError::RemoteCall { method, message, envelope }) => {
                assert_eq!(method, "crm.item.list");
                assert_eq!(message, "Access denied.");
                assert_eq!(envelope["error"], "ACCESS_DENIED");
            }
            other => panic!("expected remote call failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_code_is_used_when_description_is_missing() {
        let ctx = context(json!({"error": "QUERY_LIMIT_EXCEEDED"}));
        let err = ctx.call_batch(&[], false).await.unwrap_err();
        match err {
            RestError::RemoteCall { method, message, .. } => {
                assert_eq!(method, "batch");
                assert_eq!(message, "QUERY_LIMIT_EXCEEDED");
            }
            other => panic!("expected remote call failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_object_envelope_is_invalid() {
        let ctx = context(json!("oops"));
        let err = ctx.call("user.get", &Params::new()).await.unwrap_err();
        assert!(matches!(err, RestError::InvalidResponse(_)));
    }

    #[test]
    fn settings_follow_client_config() {
        let mut config = ClientConfig::new("https://portal.example/rest/1/abc/");
        config.batch_size = 20;
        let settings = RestSettings::from(&config);
        assert_eq!(settings.batch_size, 20);
        assert_eq!(settings.page_size, 50);
    }
}
