//! # B24Rest Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The inbound-webhook transport over `reqwest`
//! - HTTP client with retry/backoff and error conversions
//! - Configuration loading from environment and files
//! - A factory handing out ready-to-use services
//! - Tracing bootstrap
//!
//! ## Architecture
//! - Implements traits defined in `b24rest-core`
//! - Depends on `b24rest-domain` and `b24rest-core`
//! - Contains all "impure" code (network, environment, files)

pub mod config;
pub mod errors;
pub mod factory;
pub mod http;
pub mod logging;
pub mod webhook;

// Re-export commonly used items
pub use errors::InfraError;
pub use factory::RestClientFactory;
pub use http::{HttpClient, HttpClientBuilder};
pub use logging::{init_tracing, LogFormat};
pub use webhook::WebhookTransport;
