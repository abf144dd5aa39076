//! [`RestTransport`] over an inbound webhook URL

use async_trait::async_trait;
use b24rest_core::RestTransport;
use b24rest_domain::{Command, Params, RestError, Result};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};
use url::Url;

use super::query::build_query;
use crate::errors::status_error;
use crate::http::HttpClient;

const BATCH_METHOD: &str = "batch";

/// Posts every call to `{webhook}/{method}.json`.
///
/// The raw envelope is returned untouched, error envelopes included; the
/// caller's [`b24rest_core::RestContext`] decides what counts as failure.
#[derive(Debug, Clone)]
pub struct WebhookTransport {
    http: HttpClient,
    base: Url,
}

impl WebhookTransport {
    /// Create a transport for `webhook_url`.
    ///
    /// # Errors
    /// `RestError::Config` when the URL is blank or unparsable.
    pub fn new(webhook_url: &str, http: HttpClient) -> Result<Self> {
        let base = normalize_webhook_url(webhook_url)?;
        Ok(Self { http, base })
    }

    /// Webhook base, always ending with a single `/`.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, method: &str) -> Result<Url> {
        let path = format!("{}.json", method.trim().trim_start_matches('/'));
        self.base
            .join(&path)
            .map_err(|err| RestError::InvalidInput(format!("invalid method name `{method}`: {err}")))
    }

    async fn post(&self, method: &str, body: &Value) -> Result<Value> {
        let url = self.endpoint(method)?;
        let response = self.http.post_json(&url, body).await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| RestError::Network(format!("failed to read response body: {err}")))?;

        match serde_json::from_str::<Value>(&text) {
            Ok(envelope @ Value::Object(_)) => Ok(envelope),
            _ if !status.is_success() => Err(status_error(status)),
            _ => {
                debug!(%status, bytes = text.len(), "non-JSON response body");
                Err(RestError::InvalidResponse(format!("`{method}` returned a non-JSON response")))
            }
        }
    }
}

#[async_trait]
impl RestTransport for WebhookTransport {
    #[instrument(skip(self, params), fields(method = %method))]
    async fn call(&self, method: &str, params: &Params) -> Result<Value> {
        self.post(method, &Value::Object(params.clone())).await
    }

    #[instrument(skip(self, commands), fields(commands = commands.len()))]
    async fn call_batch(&self, commands: &[Command], halt: bool) -> Result<Value> {
        let mut cmd = Map::new();
        for command in commands {
            let query = build_query(&command.params);
            let line = if query.is_empty() {
                command.method.clone()
            } else {
                format!("{}?{query}", command.method)
            };
            cmd.insert(command.key.clone(), Value::String(line));
        }

        let body = json!({ "halt": u8::from(halt), "cmd": cmd });
        self.post(BATCH_METHOD, &body).await
    }
}

/// Trim the URL and make it end with exactly one `/`.
fn normalize_webhook_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(RestError::Config("webhook URL is not configured".into()));
    }

    Url::parse(&format!("{trimmed}/"))
        .map_err(|err| RestError::Config(format!("invalid webhook URL `{trimmed}`: {err}")))
}
