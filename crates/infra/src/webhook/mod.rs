//! Inbound-webhook transport

pub mod query;
pub mod transport;

pub use query::build_query;
pub use transport::WebhookTransport;
