use std::time::Duration;

use b24rest_domain::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS};
use b24rest_domain::RestError;
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::errors::InfraError;

/// Longest pause honoured from a `Retry-After` header.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// JSON POST client for webhook calls.
///
/// Remote writes are not idempotent, so a client starts with a single
/// attempt. When retries are enabled, only failures where the portal
/// rejected the request before running it are repeated: connection
/// errors, `429` and `503` (the portal's query-limit answer). A `500` or a
/// timeout may hide an applied write and is returned as-is.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client with default timeout and a single attempt.
    pub fn new() -> Result<Self, RestError> {
        Self::builder().build()
    }

    pub const fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// POST `body` as JSON to `url`.
    ///
    /// The response of the last attempt is returned whatever its status;
    /// the caller decides how to read it.
    ///
    /// # Errors
    /// `RestError::InvalidInput` when the body cannot be serialized, and a
    /// network error once attempts run out.
    pub async fn post_json(&self, url: &Url, body: &Value) -> Result<Response, RestError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| RestError::InvalidInput(format!("request body is not serializable: {err}")))?;
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!(attempt, path = url.path(), "posting webhook request");
            let sent = self
                .client
                .post(url.clone())
                .header(CONTENT_TYPE, "application/json")
                .body(payload.clone())
                .send()
                .await;

            let delay = match sent {
                Ok(response) if attempt < attempts && is_rejected_unprocessed(response.status()) => {
                    warn!(attempt, status = %response.status(), "portal rejected request, retrying");
                    retry_after(response.headers()).unwrap_or_else(|| self.backoff_delay(attempt))
                }
                Ok(response) => {
                    debug!(attempt, status = %response.status(), "webhook response received");
                    return Ok(response);
                }
                Err(err) if attempt < attempts && err.is_connect() => {
                    warn!(attempt, error = %err, "connection failed, retrying");
                    self.backoff_delay(attempt)
                }
                Err(err) => return Err(InfraError::from(err).into()),
            };

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }

    /// Doubling pause after the `attempt`-th try.
    fn backoff_delay(&self, attempt: usize) -> Duration {
        let shift = attempt.saturating_sub(1).min(8) as u32;
        self.base_backoff.saturating_mul(1u32 << shift)
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(500),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts per call, the first one included.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, RestError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| RestError::from(InfraError::from(err)))?;
        Ok(HttpClient { client, max_attempts: self.max_attempts, base_backoff: self.base_backoff })
    }
}

fn is_rejected_unprocessed(status: StatusCode) -> bool {
    matches!(status, StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE)
}

/// Pause requested through a `Retry-After: <seconds>` header.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let seconds = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(seconds).min(MAX_RETRY_AFTER))
}
