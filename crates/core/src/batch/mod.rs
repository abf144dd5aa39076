//! Batch multiplexing of many commands over size-capped batch calls

pub mod multiplexer;

pub use multiplexer::{BatchMultiplexer, BatchResults, CommandSet};
