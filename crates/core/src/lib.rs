//! # B24Rest Core
//!
//! Client-side correctness layer over a paginated, size-limited RPC API.
//! No HTTP code lives here: every call goes through the
//! [`RestTransport`] port carried by an injected [`RestContext`].
//!
//! This crate contains:
//! - Field-name translation between the request and response dialects
//! - Permissive readers for loosely shaped response envelopes
//! - Batch multiplexing with all-or-nothing chunk semantics
//! - Exhaustive fetch over ID cursors and `start`/`next` offsets
//! - Order-preserving tree replication onto head-inserting stores
//! - Entity services composed from the above
//!
//! ## Architecture Principles
//! - Only depends on `b24rest-domain`
//! - No global state; the context is passed to every component
//! - Calls are strictly sequential; the only suspension point is the
//!   transport
//! - Every failure is terminal for the operation that raised it

pub mod batch;
pub mod context;
pub mod fields;
pub mod pagination;
pub mod response;
pub mod services;
pub mod tree;

// Infrastructure ports
pub mod transport_ports;

pub use batch::{BatchMultiplexer, BatchResults, CommandSet};
pub use context::{RestContext, RestSettings};
pub use fields::FieldNameCodec;
pub use pagination::{CursorPaginator, CursorPlan, OffsetPaginator};
pub use response::ResultShape;
pub use services::{
    CatalogResource, CatalogService, ChecklistFactory, CrmItemService, DepartmentService,
    ItemUpdate, ProductRowService, ProductRows, TaskService,
};
pub use transport_ports::RestTransport;
pub use tree::{ChildFactory, TreeReplicator};
