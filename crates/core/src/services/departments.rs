//! Departments (`department.*`) and their users (`user.get`)
//!
//! Both methods predate the `start = -1` fast path and only page through
//! `start`/`next` offsets.

use b24rest_domain::{Params, Record, Result};
use serde_json::{json, Value};

use super::{object_param, single};
use crate::context::RestContext;
use crate::pagination::OffsetPaginator;
use crate::response::{extract_boolean, extract_created_id, extract_list};

const METHOD_GET: &str = "department.get";
const METHOD_ADD: &str = "department.add";
const METHOD_UPDATE: &str = "department.update";
const METHOD_DELETE: &str = "department.delete";
const METHOD_USER_GET: &str = "user.get";

#[derive(Debug, Clone)]
pub struct DepartmentService {
    context: RestContext,
}

impl DepartmentService {
    pub const fn new(context: RestContext) -> Self {
        Self { context }
    }

    /// Every department matching `params`, ordered by `ID`.
    pub async fn all(&self, params: &Params) -> Result<Vec<Record>> {
        let mut request = params.clone();
        for key in ["ID", "id", "start", "order", "ORDER"] {
            request.remove(key);
        }
        request.insert("order".to_string(), json!({ "ID": "ASC" }));

        OffsetPaginator::new(self.context.clone()).fetch_all(METHOD_GET, &request, &[]).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        let envelope = self.context.call(METHOD_GET, &single("ID", id)).await?;
        Ok(extract_list(&envelope, &[]).into_iter().next())
    }

    /// Create a department; `fields` are sent flat, next to `params`.
    pub async fn add(&self, fields: &Params, params: &Params) -> Result<Option<String>> {
        let mut request = params.clone();
        request.extend(fields.clone());

        let envelope = self.context.call(METHOD_ADD, &request).await?;
        Ok(envelope.get("result").and_then(extract_created_id))
    }

    pub async fn update(&self, id: i64, fields: &Params, params: &Params) -> Result<bool> {
        let mut request = params.clone();
        request.extend(fields.clone());
        request.insert("ID".to_string(), json!(id));

        let envelope = self.context.call(METHOD_UPDATE, &request).await?;
        Ok(extract_boolean(&envelope))
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let envelope = self.context.call(METHOD_DELETE, &single("ID", id)).await?;
        Ok(extract_boolean(&envelope))
    }

    /// Every user of a department, `ID` ascending unless `params` sorts.
    pub async fn users(&self, department_id: i64, params: &Params) -> Result<Vec<Record>> {
        let mut request = params.clone();
        request.remove("start");

        let mut filter = object_param(&request, "FILTER");
        filter.insert("UF_DEPARTMENT".to_string(), json!(department_id));
        request.insert("FILTER".to_string(), Value::Object(filter));

        if !request.contains_key("SORT") && !request.contains_key("sort") {
            request.insert("SORT".to_string(), json!("ID"));
        }
        if !request.contains_key("ORDER") && !request.contains_key("order") {
            request.insert("ORDER".to_string(), json!("ASC"));
        }

        OffsetPaginator::new(self.context.clone()).fetch_all(METHOD_USER_GET, &request, &[]).await
    }
}
