//! Client configuration structures

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_ITERATIONS, DEFAULT_PAGE_SIZE,
    DEFAULT_TIMEOUT_SECS,
};
use crate::{RestError, Result};

/// Connection and paging settings for one portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Inbound webhook base URL, e.g. `https://portal.example/rest/1/token/`.
    pub webhook_url: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Total HTTP attempts per call. Writes are not idempotent, so this
    /// stays at one unless the caller opts in.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl ClientConfig {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Reject settings that would make the algorithms meaningless.
    ///
    /// # Errors
    /// Returns `RestError::Config` for a blank webhook URL or any zero limit.
    pub fn validate(&self) -> Result<()> {
        if self.webhook_url.trim().is_empty() {
            return Err(RestError::Config("webhook_url must not be empty".into()));
        }

        let limits = [
            ("batch_size", self.batch_size),
            ("page_size", self.page_size),
            ("max_iterations", self.max_iterations),
            ("max_attempts", self.max_attempts),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
            return Err(RestError::Config(format!("{name} must be greater than zero")));
        }

        if self.timeout_seconds == 0 {
            return Err(RestError::Config("timeout_seconds must be greater than zero".into()));
        }

        Ok(())
    }
}

const fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

const fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

const fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}
