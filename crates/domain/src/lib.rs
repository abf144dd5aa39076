//! # B24Rest Domain
//!
//! Data model shared by the REST client layers.
//!
//! This crate contains:
//! - Commands, records, list pages, cursors and tree nodes
//! - The error taxonomy and Result alias
//! - Client configuration
//! - Limits, prefixes and CRM entity type identifiers
//!
//! ## Architecture
//! - No dependencies on other B24Rest crates
//! - Only external dependencies allowed
//! - Pure data structures and value logic, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
