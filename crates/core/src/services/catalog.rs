//! Reference catalogs: measures, price types and currencies
//!
//! The three resources share one shape of list/get/add/update/delete
//! methods and differ only in method names, key spelling and list keys,
//! so a single service runs over a static descriptor.

use b24rest_domain::{Command, ListPage, Params, Record, Result};
use serde_json::{json, Value};
use tracing::instrument;

use super::{single, ItemUpdate};
use crate::batch::{BatchMultiplexer, CommandSet};
use crate::context::RestContext;
use crate::pagination::{CursorPaginator, CursorPlan, OffsetPaginator};
use crate::response::{acknowledge, extract_boolean, extract_created_id};

/// Static description of one catalog resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogResource {
    /// Method namespace, e.g. `catalog.measure`.
    pub namespace: &'static str,
    /// Cursor field in `filter`, `order` and `select`.
    pub cursor_field: &'static str,
    /// Key of the id in `update` requests.
    pub update_id_key: &'static str,
    /// List key inside `result`, when the list is not the result itself.
    pub list_key: Option<&'static str>,
    /// Default `order` of single-page listing.
    pub default_order_field: &'static str,
    /// Prefix of batch command keys.
    pub key_prefix: &'static str,
}

impl CatalogResource {
    pub const MEASURES: Self = Self {
        namespace: "catalog.measure",
        cursor_field: "id",
        update_id_key: "id",
        list_key: Some("measures"),
        default_order_field: "id",
        key_prefix: "measure",
    };

    pub const PRICE_TYPES: Self = Self {
        namespace: "catalog.priceType",
        cursor_field: "id",
        update_id_key: "id",
        list_key: Some("priceTypes"),
        default_order_field: "id",
        key_prefix: "price_type",
    };

    pub const CURRENCIES: Self = Self {
        namespace: "crm.currency",
        cursor_field: "ID",
        update_id_key: "ID",
        list_key: None,
        default_order_field: "currency",
        key_prefix: "currency",
    };

    fn method(&self, operation: &str) -> String {
        format!("{}.{operation}", self.namespace)
    }

    fn list_keys(&self) -> Vec<&'static str> {
        self.list_key.into_iter().collect()
    }
}

#[derive(Debug, Clone)]
pub struct CatalogService {
    context: RestContext,
    resource: CatalogResource,
}

impl CatalogService {
    pub const fn new(context: RestContext, resource: CatalogResource) -> Self {
        Self { context, resource }
    }

    pub const fn resource(&self) -> CatalogResource {
        self.resource
    }

    pub async fn list(&self, params: &Params, page: usize) -> Result<ListPage> {
        let mut request = params.clone();
        let has_order = request.get("order").and_then(Value::as_object).is_some_and(|o| !o.is_empty());
        if !has_order {
            let order = single(self.resource.default_order_field, "ASC");
            request.insert("order".to_string(), Value::Object(order));
        }

        OffsetPaginator::new(self.context.clone())
            .fetch_page(&self.resource.method("list"), &request, page, &self.resource.list_keys())
            .await
    }

    /// Every record, ascending by the cursor field; any caller `order` is
    /// ignored.
    ///
    /// # Errors
    /// `RestError::UsageConflict` when the filter mentions the cursor field.
    #[instrument(skip(self, params), fields(resource = self.resource.namespace))]
    pub async fn all(&self, params: &Params) -> Result<Vec<Record>> {
        let mut request = params.clone();
        if let Some(select) = request.get("select") {
            let select = ensure_select_contains(select, self.resource.cursor_field);
            request.insert("select".to_string(), select);
        }

        let plan = CursorPlan::ascending(self.resource.cursor_field)
            .with_list_keys(&self.resource.list_keys());
        CursorPaginator::new(self.context.clone())
            .fetch_all(&self.resource.method("list"), &request, &plan)
            .await
    }

    pub async fn get_by_id(&self, id: impl Into<Value> + Send) -> Result<Option<Record>> {
        let envelope = self.context.call(&self.resource.method("get"), &single("id", id)).await?;
        Ok(envelope.get("result").and_then(Value::as_object).cloned())
    }

    pub async fn add(&self, fields: &Params, params: &Params) -> Result<Option<String>> {
        let envelope = self.context.call(&self.resource.method("add"), &with_fields(params, fields)).await?;
        Ok(envelope.get("result").and_then(extract_created_id))
    }

    pub async fn add_many(&self, items: &[Params], params: &Params) -> Result<Vec<Option<String>>> {
        let requests = items.iter().map(|fields| with_fields(params, fields)).collect();
        let prefix = format!("{}_add", self.resource.key_prefix);

        let results = BatchMultiplexer::new(self.context.clone())
            .bulk(&self.resource.method("add"), requests, &prefix)
            .await?;
        Ok(results.iter().map(|result| result.as_ref().and_then(extract_created_id)).collect())
    }

    pub async fn update(&self, id: impl Into<Value> + Send, fields: &Params, params: &Params) -> Result<bool> {
        let mut request = with_fields(params, fields);
        request.insert(self.resource.update_id_key.to_string(), id.into());

        let envelope = self.context.call(&self.resource.method("update"), &request).await?;
        Ok(acknowledge(envelope.get("result")))
    }

    pub async fn update_many(&self, items: &[ItemUpdate], params: &Params) -> Result<Vec<bool>> {
        let prefix = format!("{}_update", self.resource.key_prefix);
        let method = self.resource.method("update");

        let mut commands = CommandSet::new();
        for (index, item) in items.iter().enumerate() {
            let mut request = with_fields(params, &item.fields);
            request.insert(self.resource.update_id_key.to_string(), item.id.clone());
            commands.push(Command::new(Command::positional_key(&prefix, index), method.clone(), request))?;
        }

        let results = BatchMultiplexer::new(self.context.clone()).execute(&commands, false).await?;
        Ok(commands.as_slice().iter().map(|command| acknowledge(results.get(&command.key))).collect())
    }

    pub async fn delete(&self, id: impl Into<Value> + Send) -> Result<bool> {
        let envelope = self.context.call(&self.resource.method("delete"), &single("id", id)).await?;
        Ok(extract_boolean(&envelope))
    }
}

fn with_fields(params: &Params, fields: &Params) -> Params {
    let mut request = params.clone();
    request.insert("fields".to_string(), Value::Object(fields.clone()));
    request
}

/// Append `field` to a select list unless it, or `*`, is already there.
fn ensure_select_contains(select: &Value, field: &str) -> Value {
    let fields = match select {
        Value::Array(fields) if !fields.is_empty() => fields,
        _ => return json!([field]),
    };

    let present = fields
        .iter()
        .filter_map(Value::as_str)
        .any(|item| item == "*" || item.eq_ignore_ascii_case(field));
    let mut fields = fields.clone();
    if !present {
        fields.push(json!(field));
    }
    Value::Array(fields)
}
