//! Domain types and models

pub mod command;
pub mod crm;
pub mod fields;
pub mod listing;
pub mod sort;
pub mod tree;

use serde_json::{Map, Value};

pub use command::Command;
pub use crm::{entity_type_abbreviation, is_dynamic_entity_type, SystemEntityType};
pub use fields::{FieldDirection, FieldShape, UserFieldNames};
pub use listing::{Cursor, ListPage, ListResponse, Pagination};
pub use sort::{SortDirection, SortKey};
pub use tree::{CreatedNode, TreeNode};

/// A record as returned by the remote API, keys in response order.
pub type Record = Map<String, Value>;

/// Parameters of one remote call.
pub type Params = Map<String, Value>;
