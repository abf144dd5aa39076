//! Product rows (`crm.item.productrow.*`) attached to one owner type

use b24rest_domain::{entity_type_abbreviation, Params, Record, RestError, Result, UserFieldNames};
use serde_json::{json, Value};
use tracing::instrument;

use super::{object_param, single};
use crate::context::RestContext;
use crate::fields::{filter_mentions_field, normalize_fields, normalize_record, FieldNameCodec};
use crate::response::{acknowledge, extract_by_path, extract_list_response};

const METHOD_ADD: &str = "crm.item.productrow.add";
const METHOD_UPDATE: &str = "crm.item.productrow.update";
const METHOD_GET: &str = "crm.item.productrow.get";
const METHOD_LIST: &str = "crm.item.productrow.list";
const METHOD_DELETE: &str = "crm.item.productrow.delete";

const OWNER_FIELDS: [&str; 2] = ["ownerType", "ownerId"];

/// Rows of one product list, plus the server's total.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRows {
    pub items: Vec<Record>,
    pub total: Option<i64>,
}

/// Product rows of entities sharing one owner type abbreviation.
#[derive(Debug, Clone)]
pub struct ProductRowService {
    context: RestContext,
    owner_type: String,
}

impl ProductRowService {
    pub fn new(context: RestContext, owner_type: impl Into<String>) -> Self {
        Self { context, owner_type: owner_type.into() }
    }

    /// Service for the entity type `entity_type_id` (`D` for deals, `T8a`
    /// for a smart process, ...).
    ///
    /// # Errors
    /// `RestError::InvalidInput` when the type has no abbreviation.
    pub fn for_entity_type(context: RestContext, entity_type_id: i64) -> Result<Self> {
        Ok(Self::new(context, entity_type_abbreviation(entity_type_id)?))
    }

    pub fn owner_type(&self) -> &str {
        &self.owner_type
    }

    pub async fn add(&self, owner_id: i64, fields: &Params, params: &Params) -> Result<Option<Record>> {
        let mut fields = normalize_fields(&codec(), fields);
        fields.insert("ownerId".to_string(), json!(owner_id));
        fields.insert("ownerType".to_string(), json!(self.owner_type));

        let mut request = params.clone();
        request.insert("fields".to_string(), Value::Object(fields));
        self.row_call(METHOD_ADD, &request).await
    }

    pub async fn update(&self, id: i64, fields: &Params, params: &Params) -> Result<Option<Record>> {
        let mut request = params.clone();
        request.insert("id".to_string(), json!(id));
        request.insert("fields".to_string(), Value::Object(normalize_fields(&codec(), fields)));
        self.row_call(METHOD_UPDATE, &request).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Record>> {
        self.row_call(METHOD_GET, &single("id", id)).await
    }

    /// Rows of `owner_id`; the owner conditions are added here.
    ///
    /// # Errors
    /// `RestError::UsageConflict` when the filter already mentions
    /// `ownerType` or `ownerId`.
    #[instrument(skip(self, params), fields(owner_type = %self.owner_type))]
    pub async fn list(&self, owner_id: i64, params: &Params) -> Result<ProductRows> {
        let mut filter = object_param(params, "filter");
        if filter_mentions_field(&filter, &OWNER_FIELDS) {
            return Err(RestError::UsageConflict(
                "product row listing sets ownerType/ownerId itself; remove them from the filter"
                    .to_string(),
            ));
        }
        filter.insert("=ownerType".to_string(), json!(self.owner_type));
        filter.insert("=ownerId".to_string(), json!(owner_id));

        let mut request = params.clone();
        request.insert("filter".to_string(), Value::Object(filter));

        let envelope = self.context.call(METHOD_LIST, &request).await?;
        let response = extract_list_response(&envelope, &["productRows"]);
        Ok(ProductRows {
            items: response.items.into_iter().map(normalize_record).collect(),
            total: response.total,
        })
    }

    /// Delete a row; a bare `null` result counts as success.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let envelope = self.context.call(METHOD_DELETE, &single("id", id)).await?;
        Ok(acknowledge(envelope.get("result")))
    }

    async fn row_call(&self, method: &str, request: &Params) -> Result<Option<Record>> {
        let envelope = self.context.call(method, request).await?;
        Ok(extract_by_path(&envelope, &["result", "productRow"])
            .and_then(Value::as_object)
            .cloned()
            .map(normalize_record))
    }
}

const fn codec() -> FieldNameCodec {
    FieldNameCodec::new(UserFieldNames::Dynamic)
}
