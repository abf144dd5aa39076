//! Tasks, checklists and elapsed time (`tasks.task.*`, `task.*`)

use std::collections::HashSet;

use b24rest_domain::{
    Command, CreatedNode, ListPage, Params, Record, Result, SortDirection, SortKey, TreeNode,
};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use super::{object_param, single};
use crate::batch::{BatchMultiplexer, CommandSet};
use crate::context::RestContext;
use crate::pagination::{
    sort_records, CursorPaginator, CursorPlan, OffsetPaginator, OrderPolicy, ParamCase, Termination,
};
use crate::response::{
    acknowledge, coerce_int, extract_by_path, extract_created_id, extract_list,
};
use crate::tree::{ChildFactory, TreeReplicator};

const METHOD_TASK_ADD: &str = "tasks.task.add";
const METHOD_TASK_UPDATE: &str = "tasks.task.update";
const METHOD_TASK_GET: &str = "tasks.task.get";
const METHOD_TASK_LIST: &str = "tasks.task.list";
const METHOD_TASK_COMPLETE: &str = "tasks.task.complete";
const METHOD_TASK_DELETE: &str = "tasks.task.delete";
const METHOD_TEMPLATE_GET: &str = "tasks.template.get";
const METHOD_TEMPLATE_CHECKLIST: &str = "tasks.template.checklist.list";
const METHOD_CHECKLIST_ADD: &str = "task.checklistitem.add";
const METHOD_ELAPSED_LIST: &str = "task.elapseditem.getlist";

const TASK_LIST_KEYS: [&str; 1] = ["tasks"];
const ELAPSED_LIST_KEYS: [&str; 3] = ["elapsedItems", "elapseditems", "elapsed"];
const CHECKLIST_KEY_PREFIX: &str = "checklist_add";

/// Creates checklist items of one task.
///
/// `task.checklistitem.add` places every new item at the top of its
/// parent, which is what [`TreeReplicator`] compensates for.
#[derive(Debug, Clone, Copy)]
pub struct ChecklistFactory {
    task_id: i64,
}

impl ChecklistFactory {
    pub const fn new(task_id: i64) -> Self {
        Self { task_id }
    }
}

impl ChildFactory for ChecklistFactory {
    fn create_command(&self, parent_id: i64, title: &str) -> (String, Params) {
        let mut params = single("taskId", self.task_id);
        params.insert("fields".to_string(), json!({ "TITLE": title, "PARENT_ID": parent_id }));
        (METHOD_CHECKLIST_ADD.to_string(), params)
    }

    fn key_prefix(&self) -> &str {
        CHECKLIST_KEY_PREFIX
    }
}

#[derive(Debug, Clone)]
pub struct TaskService {
    context: RestContext,
}

impl TaskService {
    pub const fn new(context: RestContext) -> Self {
        Self { context }
    }

    /// Create a task; returns the echoed task, or just its id.
    pub async fn task_add(&self, fields: &Params, params: &Params) -> Result<Option<Record>> {
        let mut request = params.clone();
        request.insert("fields".to_string(), Value::Object(fields.clone()));

        let envelope = self.context.call(METHOD_TASK_ADD, &request).await?;
        if let Some(task) = extract_by_path(&envelope, &["result", "task"]).and_then(Value::as_object) {
            return Ok(Some(task.clone()));
        }

        Ok(envelope
            .get("result")
            .and_then(extract_created_id)
            .map(|id| single("id", id)))
    }

    pub async fn task_update(&self, task_id: i64, fields: &Params, params: &Params) -> Result<bool> {
        let mut request = params.clone();
        request.insert("taskId".to_string(), json!(task_id));
        request.insert("fields".to_string(), Value::Object(fields.clone()));

        let envelope = self.context.call(METHOD_TASK_UPDATE, &request).await?;
        Ok(acknowledge(envelope.get("result")))
    }

    pub async fn task_get(&self, task_id: i64, params: &Params) -> Result<Option<Record>> {
        let mut request = params.clone();
        request.insert("taskId".to_string(), json!(task_id));

        let envelope = self.context.call(METHOD_TASK_GET, &request).await?;
        if let Some(task) = extract_by_path(&envelope, &["result", "task"]).and_then(Value::as_object) {
            return Ok(Some(task.clone()));
        }
        Ok(extract_list(&envelope, &["task"]).into_iter().next())
    }

    pub async fn task_list(&self, params: &Params, page: usize) -> Result<ListPage> {
        OffsetPaginator::new(self.context.clone())
            .fetch_page(METHOD_TASK_LIST, params, page, &TASK_LIST_KEYS)
            .await
    }

    /// Every task matching `params`, sorted by the caller's `order`.
    ///
    /// # Errors
    /// `RestError::UsageConflict` when the filter or order mentions `ID`.
    pub async fn task_all(&self, params: &Params) -> Result<Vec<Record>> {
        let plan = CursorPlan::descending("ID")
            .with_termination(Termination::ShortPage)
            .with_list_keys(&TASK_LIST_KEYS);

        CursorPaginator::new(self.context.clone()).fetch_all(METHOD_TASK_LIST, params, &plan).await
    }

    pub async fn task_complete(&self, task_id: i64) -> Result<bool> {
        let envelope = self.context.call(METHOD_TASK_COMPLETE, &single("taskId", task_id)).await?;
        Ok(acknowledge(envelope.get("result")))
    }

    pub async fn task_delete(&self, task_id: i64) -> Result<bool> {
        let envelope = self.context.call(METHOD_TASK_DELETE, &single("taskId", task_id)).await?;
        Ok(acknowledge(envelope.get("result")))
    }

    pub async fn template_get(&self, template_id: i64) -> Result<Option<Record>> {
        let envelope =
            self.context.call(METHOD_TEMPLATE_GET, &single("templateId", template_id)).await?;
        Ok(envelope.get("result").and_then(Value::as_object).cloned())
    }

    /// Checklist of a task template as flat tree nodes.
    pub async fn template_checklist(&self, template_id: i64) -> Result<Vec<TreeNode>> {
        let envelope =
            self.context.call(METHOD_TEMPLATE_CHECKLIST, &single("templateId", template_id)).await?;

        let items = extract_by_path(&envelope, &["result", "checkListItems"])
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(items.iter().filter_map(Value::as_object).map(checklist_node).collect())
    }

    /// Add checklist items under `parent_id` (0 for a new root group).
    ///
    /// Always goes through the batch endpoint, even for one item. Blank
    /// titles are skipped; created ids come back in input order.
    #[instrument(skip(self, titles), fields(items = titles.len()))]
    pub async fn checklist_add(
        &self,
        task_id: i64,
        titles: &[String],
        parent_id: i64,
    ) -> Result<Vec<Option<i64>>> {
        let factory = ChecklistFactory::new(task_id);
        let mut commands = CommandSet::new();
        for (index, title) in titles.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).enumerate() {
            let (method, params) = factory.create_command(parent_id, title);
            commands.push(Command::new(Command::positional_key(CHECKLIST_KEY_PREFIX, index), method, params))?;
        }

        let results = BatchMultiplexer::new(self.context.clone()).execute(&commands, false).await?;
        Ok(commands
            .as_slice()
            .iter()
            .map(|command| results.get(&command.key).and_then(|result| factory.created_id(result)))
            .collect())
    }

    /// Recreate a template's checklist on a task, keeping its visual order.
    #[instrument(skip(self))]
    pub async fn copy_template_checklist(
        &self,
        task_id: i64,
        template_id: i64,
    ) -> Result<Vec<CreatedNode>> {
        let nodes = self.template_checklist(template_id).await?;
        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        let replicator = TreeReplicator::new(BatchMultiplexer::new(self.context.clone()));
        let created = replicator.replicate(&nodes, &ChecklistFactory::new(task_id)).await?;
        info!(created = created.len(), "template checklist copied");
        Ok(created)
    }

    /// Every elapsed-time record matching `params` (upper-case `FILTER`),
    /// newest first.
    pub async fn elapsed_all(&self, params: &Params) -> Result<Vec<Record>> {
        let plan = CursorPlan::descending("ID")
            .with_param_case(ParamCase::Upper)
            .with_termination(Termination::ShortPage)
            .with_order_policy(OrderPolicy::Fixed)
            .with_list_keys(&ELAPSED_LIST_KEYS);

        CursorPaginator::new(self.context.clone())
            .fetch_all(METHOD_ELAPSED_LIST, params, &plan)
            .await
    }

    pub async fn elapsed_all_by_task(&self, task_id: i64, params: &Params) -> Result<Vec<Record>> {
        let mut filter = object_param(params, "FILTER");
        filter.extend(object_param(params, "filter"));
        filter.insert("TASK_ID".to_string(), json!(task_id));

        let mut request = params.clone();
        request.remove("filter");
        request.insert("FILTER".to_string(), Value::Object(filter));
        self.elapsed_all(&request).await
    }

    /// Elapsed-time records of every task in a workgroup, newest first.
    ///
    /// Task ids are fetched first, then queried in chunks of the page size
    /// through `FILTER.TASK_ID`.
    #[instrument(skip(self, params))]
    pub async fn elapsed_all_by_group(&self, group_id: i64, params: &Params) -> Result<Vec<Record>> {
        let task_ids = self.group_task_ids(group_id).await?;
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut filter = object_param(params, "FILTER");
        filter.extend(object_param(params, "filter"));
        filter.remove("GROUP_ID");

        let mut base = params.clone();
        base.remove("filter");

        let page_size = self.context.settings().page_size.max(1);
        let mut records = Vec::new();
        for chunk in task_ids.chunks(page_size) {
            debug!(tasks = chunk.len(), "fetching elapsed time for task chunk");
            let mut chunk_filter = filter.clone();
            chunk_filter.insert("TASK_ID".to_string(), json!(chunk));

            let mut request = base.clone();
            request.insert("FILTER".to_string(), Value::Object(chunk_filter));
            records.extend(self.elapsed_all(&request).await?);
        }

        sort_records(&mut records, &[SortKey::new("ID", SortDirection::Desc)]);
        info!(group_id, tasks = task_ids.len(), records = records.len(), "group elapsed time fetched");
        Ok(records)
    }

    /// Distinct positive task ids of a workgroup, newest first.
    async fn group_task_ids(&self, group_id: i64) -> Result<Vec<i64>> {
        let mut request = single("filter", json!({ "GROUP_ID": group_id }));
        request.insert("select".to_string(), json!(["ID"]));

        let tasks = self.task_all(&request).await?;
        let mut seen = HashSet::new();
        Ok(tasks
            .iter()
            .filter_map(|task| task.get("ID").or_else(|| task.get("id")).and_then(coerce_int))
            .filter(|id| *id > 0 && seen.insert(*id))
            .collect())
    }
}

/// Template checklist entries arrive in either casing.
fn checklist_node(item: &Record) -> TreeNode {
    let int_of = |keys: [&str; 2]| {
        keys.iter().find_map(|key| item.get(*key)).and_then(coerce_int).unwrap_or_default()
    };
    let title = ["title", "TITLE"]
        .iter()
        .find_map(|key| item.get(*key))
        .map(|title| match title {
            Value::String(text) => text.trim().to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .unwrap_or_default();

    TreeNode::new(int_of(["id", "ID"]), int_of(["parentId", "PARENT_ID"]), title, int_of(["sortIndex", "SORT"]))
}
