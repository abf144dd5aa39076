//! Universal CRM items (`crm.item.*`) for one entity type

use b24rest_domain::constants::{WILDCARD_ALL, WILDCARD_USER_FIELDS};
use b24rest_domain::{
    Command, ListPage, Params, Record, RestError, Result, SystemEntityType, UserFieldNames,
};
use serde_json::{json, Value};
use tracing::instrument;

use super::ItemUpdate;
use crate::batch::{BatchMultiplexer, CommandSet};
use crate::context::RestContext;
use crate::fields::{
    normalize_fields, normalize_filter, normalize_order, normalize_record, normalize_select,
    user_field_names_for_select, FieldNameCodec,
};
use crate::pagination::{CursorPaginator, CursorPlan, OffsetPaginator};
use crate::response::{acknowledge, coerce_int, extract_by_path, extract_created_id};

const METHOD_LIST: &str = "crm.item.list";
const METHOD_GET: &str = "crm.item.get";
const METHOD_ADD: &str = "crm.item.add";
const METHOD_UPDATE: &str = "crm.item.update";
const METHOD_DELETE: &str = "crm.item.delete";

const CURSOR_FIELD: &str = "id";

/// CRM items of a single `entityTypeId`.
///
/// Requests speak the dynamic field dialect; every returned record is keyed
/// by upper-snake response names (`ID`, `ASSIGNED_BY_ID`, `UF_CRM_1_ABC`).
#[derive(Debug, Clone)]
pub struct CrmItemService {
    context: RestContext,
    entity_type_id: i64,
}

impl CrmItemService {
    /// Create a service bound to `entity_type_id`.
    ///
    /// # Errors
    /// `RestError::InvalidInput` for a non-positive entity type id.
    pub fn new(context: RestContext, entity_type_id: i64) -> Result<Self> {
        if entity_type_id <= 0 {
            return Err(RestError::InvalidInput(format!(
                "entityTypeId must be positive, got {entity_type_id}"
            )));
        }
        Ok(Self { context, entity_type_id })
    }

    pub const fn from_system_type(context: RestContext, kind: SystemEntityType) -> Self {
        Self { context, entity_type_id: kind.id() }
    }

    pub const fn entity_type_id(&self) -> i64 {
        self.entity_type_id
    }

    /// One page of items, newest first unless `order` says otherwise.
    #[instrument(skip(self, params), fields(entity_type_id = self.entity_type_id))]
    pub async fn list(&self, params: &Params, page: usize) -> Result<ListPage> {
        let mut request = self.prepare_list_request(params, None)?;
        let has_order = request.get("order").and_then(Value::as_object).is_some_and(|o| !o.is_empty());
        if !has_order {
            request.insert("order".to_string(), json!({ CURSOR_FIELD: "DESC" }));
        }

        let mut page = OffsetPaginator::new(self.context.clone())
            .fetch_page(METHOD_LIST, &request, page, &[])
            .await?;
        page.items = page.items.into_iter().map(normalize_record).collect();
        Ok(page)
    }

    /// Every item matching `params`, sorted by the caller's `order` after
    /// the fetch.
    ///
    /// # Errors
    /// `RestError::UsageConflict` when the filter or order mentions `ID`.
    #[instrument(skip(self, params), fields(entity_type_id = self.entity_type_id))]
    pub async fn all(&self, params: &Params) -> Result<Vec<Record>> {
        let mut request = self.prepare_list_request(params, Some(UserFieldNames::Dynamic))?;
        let select = ensure_select_contains_id(request.get("select"));
        request.insert("select".to_string(), select);

        let plan = CursorPlan::descending(CURSOR_FIELD)
            .with_record_mapper(normalize_record)
            .with_sort_field_mapper(output_field_name);

        CursorPaginator::new(self.context.clone()).fetch_all(METHOD_LIST, &request, &plan).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        let mut request = self.with_entity_type_id(&Params::new())?;
        request.insert("id".to_string(), json!(id));
        request.insert("useOriginalUfNames".to_string(), json!(UserFieldNames::Dynamic.flag()));

        let envelope = self.context.call(METHOD_GET, &request).await?;
        Ok(extract_by_path(&envelope, &["result", "item"])
            .and_then(Value::as_object)
            .cloned()
            .map(normalize_record))
    }

    /// Create an item; returns its id when the response carries one.
    pub async fn add(&self, fields: &Params, params: &Params) -> Result<Option<String>> {
        let request = self.write_request(params, None, fields)?;
        let envelope = self.context.call(METHOD_ADD, &request).await?;
        Ok(envelope.get("result").and_then(extract_created_id))
    }

    /// Create many items through the batch path; ids are positional.
    #[instrument(skip_all, fields(entity_type_id = self.entity_type_id, items = items.len()))]
    pub async fn add_many(&self, items: &[Params], params: &Params) -> Result<Vec<Option<String>>> {
        let requests = items
            .iter()
            .map(|fields| self.write_request(params, None, fields))
            .collect::<Result<Vec<_>>>()?;

        let results = BatchMultiplexer::new(self.context.clone())
            .bulk(METHOD_ADD, requests, "add")
            .await?;
        Ok(results.iter().map(|result| result.as_ref().and_then(extract_created_id)).collect())
    }

    pub async fn update(&self, id: i64, fields: &Params, params: &Params) -> Result<bool> {
        let request = self.write_request(params, Some(json!(id)), fields)?;
        let envelope = self.context.call(METHOD_UPDATE, &request).await?;
        Ok(acknowledge(envelope.get("result")))
    }

    /// Update many items through the batch path; outcomes are positional.
    #[instrument(skip_all, fields(entity_type_id = self.entity_type_id, items = items.len()))]
    pub async fn update_many(&self, items: &[ItemUpdate], params: &Params) -> Result<Vec<bool>> {
        let mut commands = CommandSet::new();
        for (index, item) in items.iter().enumerate() {
            let request = self.write_request(params, Some(item.id.clone()), &item.fields)?;
            commands.push(Command::new(Command::positional_key("update", index), METHOD_UPDATE, request))?;
        }

        let results = BatchMultiplexer::new(self.context.clone()).execute(&commands, false).await?;
        Ok(commands.as_slice().iter().map(|command| acknowledge(results.get(&command.key))).collect())
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let mut request = self.with_entity_type_id(&Params::new())?;
        request.insert("id".to_string(), json!(id));

        let envelope = self.context.call(METHOD_DELETE, &request).await?;
        Ok(acknowledge(envelope.get("result")))
    }

    fn with_entity_type_id(&self, params: &Params) -> Result<Params> {
        if let Some(requested) = params.get("entityTypeId") {
            if coerce_int(requested) != Some(self.entity_type_id) {
                return Err(RestError::InvalidInput(format!(
                    "this service only serves entityTypeId {}, got {requested}",
                    self.entity_type_id
                )));
            }
        }

        let mut request = params.clone();
        request.insert("entityTypeId".to_string(), json!(self.entity_type_id));
        Ok(request)
    }

    fn write_request(&self, params: &Params, id: Option<Value>, fields: &Params) -> Result<Params> {
        let codec = FieldNameCodec::new(UserFieldNames::Dynamic);
        let mut request = self.with_entity_type_id(params)?;
        request.insert("useOriginalUfNames".to_string(), json!(UserFieldNames::Dynamic.flag()));
        if let Some(id) = id {
            request.insert("id".to_string(), id);
        }
        request.insert("fields".to_string(), Value::Object(normalize_fields(&codec, fields)));
        Ok(request)
    }

    fn prepare_list_request(
        &self,
        params: &Params,
        user_fields: Option<UserFieldNames>,
    ) -> Result<Params> {
        let mut request = self.with_entity_type_id(params)?;
        let user_fields =
            user_fields.unwrap_or_else(|| user_field_names_for_select(request.get("select")));
        let codec = FieldNameCodec::new(user_fields);
        request.insert("useOriginalUfNames".to_string(), json!(user_fields.flag()));

        if let Some(select) = request.get("select") {
            let select = Value::Array(normalize_select(&codec, select));
            request.insert("select".to_string(), select);
        }
        if let Some(order) = request.get("order").and_then(Value::as_object) {
            let order = Value::Object(normalize_order(&codec, order));
            request.insert("order".to_string(), order);
        }
        if let Some(filter) = request.get("filter").and_then(Value::as_object) {
            let filter = Value::Object(normalize_filter(&codec, filter));
            request.insert("filter".to_string(), filter);
        }
        Ok(request)
    }
}

/// Record key the caller's order field ends up under.
fn output_field_name(field: &str) -> String {
    let request_name = FieldNameCodec::new(UserFieldNames::Dynamic).to_request_name(field);
    FieldNameCodec::to_response_name(&request_name)
}

fn ensure_select_contains_id(select: Option<&Value>) -> Value {
    let fields = match select {
        Some(Value::Array(fields)) if !fields.is_empty() => fields,
        _ => return json!([WILDCARD_ALL, WILDCARD_USER_FIELDS]),
    };

    let has_id = fields
        .iter()
        .filter_map(Value::as_str)
        .any(|field| field == CURSOR_FIELD || field == WILDCARD_ALL);
    let mut fields = fields.clone();
    if !has_id {
        fields.push(json!(CURSOR_FIELD));
    }
    Value::Array(fields)
}
