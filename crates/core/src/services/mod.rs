//! Entity services composed from the batch, pagination and tree algorithms
//!
//! Every service owns a clone of the [`RestContext`](crate::RestContext)
//! and nothing else; services are cheap to build per call site.

pub mod catalog;
pub mod crm_items;
pub mod departments;
pub mod product_rows;
pub mod tasks;

use b24rest_domain::{Params, Record, RestError, Result};
use serde_json::Value;

pub use catalog::{CatalogResource, CatalogService};
pub use crm_items::CrmItemService;
pub use departments::DepartmentService;
pub use product_rows::{ProductRowService, ProductRows};
pub use tasks::{ChecklistFactory, TaskService};

/// One entry of a bulk update: target id plus the fields to write.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemUpdate {
    pub id: Value,
    pub fields: Params,
}

impl ItemUpdate {
    pub fn new(id: impl Into<Value>, fields: Params) -> Self {
        Self { id: id.into(), fields }
    }

    /// Read an `{ id | ID, fields | FIELDS }` map; `position` is 1-based and
    /// only used in the error message.
    ///
    /// # Errors
    /// `RestError::InvalidInput` when the id is blank or `fields` is not an
    /// object.
    pub fn from_record(record: &Record, position: usize) -> Result<Self> {
        let id = record
            .get("id")
            .or_else(|| record.get("ID"))
            .filter(|id| match id {
                Value::Number(_) => true,
                Value::String(text) => !text.trim().is_empty(),
                _ => false,
            })
            .cloned()
            .ok_or_else(|| {
                RestError::InvalidInput(format!("item at position {position} needs a non-empty id"))
            })?;

        let fields = record
            .get("fields")
            .or_else(|| record.get("FIELDS"))
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| {
                RestError::InvalidInput(format!("item at position {position} needs a fields object"))
            })?;

        Ok(Self { id, fields })
    }
}

/// Object-valued parameter, or an empty map.
pub(crate) fn object_param(params: &Params, key: &str) -> Params {
    params.get(key).and_then(Value::as_object).cloned().unwrap_or_default()
}

pub(crate) fn single(key: &str, value: impl Into<Value>) -> Params {
    let mut params = Params::new();
    params.insert(key.to_string(), value.into());
    params
}
