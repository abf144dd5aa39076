//! Exhaustive fetch over a monotonic ID cursor
//!
//! Each iteration asks for `start = -1` (no offset counting on the server)
//! and narrows the filter with a strict inequality on the cursor field past
//! the last boundary. The boundary must strictly advance every iteration;
//! a page that does not move it is a data or query defect and fails the
//! fetch instead of looping.
//!
//! ## State machine
//!
//! ```text
//! Running -> Advancing -> Running ...
//!         -> Terminated           (empty page, or short page when configured)
//!         -> Err(..)              (stall, missing cursor values, iteration limit)
//! ```

use b24rest_domain::constants::START_WITHOUT_COUNT;
use b24rest_domain::{Cursor, Params, Record, RestError, Result, SortDirection, SortKey};
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument};

use super::sort::sort_records;
use crate::context::RestContext;
use crate::fields::{filter_mentions_field, order_mentions_field, parse_order};
use crate::response::{coerce_int, extract_list};

/// When the loop stops on a page that still carried records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Only an empty page ends the fetch.
    EmptyPage,
    /// A page shorter than the page size also ends the fetch.
    ShortPage,
}

/// What happens to the caller's `order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPolicy {
    /// Removed from the request and applied as a sort after the fetch.
    ClientSide,
    /// Discarded; output stays in cursor order.
    Fixed,
}

/// Casing of the `filter`/`order` parameter keys a method expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamCase {
    Lower,
    Upper,
}

impl ParamCase {
    const fn filter_key(self) -> (&'static str, &'static str) {
        match self {
            Self::Lower => ("filter", "FILTER"),
            Self::Upper => ("FILTER", "filter"),
        }
    }

    const fn order_key(self) -> (&'static str, &'static str) {
        match self {
            Self::Lower => ("order", "ORDER"),
            Self::Upper => ("ORDER", "order"),
        }
    }
}

/// Description of one cursor-driven list method.
#[derive(Debug, Clone)]
pub struct CursorPlan {
    /// Cursor field as spelled in `filter`/`order` of the request.
    pub request_field: String,
    /// Record keys the boundary value is read from, first match wins.
    pub record_fields: Vec<String>,
    pub direction: SortDirection,
    pub termination: Termination,
    pub param_case: ParamCase,
    pub order_policy: OrderPolicy,
    /// Candidate keys for the list inside `result`.
    pub list_keys: Vec<String>,
    /// Applied to every record before the boundary is read.
    pub record_mapper: Option<fn(Record) -> Record>,
    /// Maps the caller's order fields onto record keys for the final sort.
    pub sort_field_mapper: Option<fn(&str) -> String>,
}

impl CursorPlan {
    /// Newest-first cursor ending on an empty page, caller order applied
    /// client-side.
    pub fn descending(request_field: impl Into<String>) -> Self {
        Self::with_defaults(request_field.into(), SortDirection::Desc, Termination::EmptyPage)
            .with_order_policy(OrderPolicy::ClientSide)
    }

    /// Oldest-first cursor ending on a short page, caller order discarded.
    pub fn ascending(request_field: impl Into<String>) -> Self {
        Self::with_defaults(request_field.into(), SortDirection::Asc, Termination::ShortPage)
            .with_order_policy(OrderPolicy::Fixed)
    }

    fn with_defaults(request_field: String, direction: SortDirection, termination: Termination) -> Self {
        let record_fields = vec![request_field.to_uppercase(), request_field.to_lowercase()];
        Self {
            request_field,
            record_fields,
            direction,
            termination,
            param_case: ParamCase::Lower,
            order_policy: OrderPolicy::ClientSide,
            list_keys: Vec::new(),
            record_mapper: None,
            sort_field_mapper: None,
        }
    }

    pub const fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    pub const fn with_param_case(mut self, param_case: ParamCase) -> Self {
        self.param_case = param_case;
        self
    }

    pub const fn with_order_policy(mut self, order_policy: OrderPolicy) -> Self {
        self.order_policy = order_policy;
        self
    }

    pub fn with_list_keys(mut self, keys: &[&str]) -> Self {
        self.list_keys = keys.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_record_fields(mut self, fields: &[&str]) -> Self {
        self.record_fields = fields.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_record_mapper(mut self, mapper: fn(Record) -> Record) -> Self {
        self.record_mapper = Some(mapper);
        self
    }

    pub fn with_sort_field_mapper(mut self, mapper: fn(&str) -> String) -> Self {
        self.sort_field_mapper = Some(mapper);
        self
    }

    /// Filter key carrying the boundary, e.g. `<id` or `>ID`.
    pub fn boundary_key(&self) -> String {
        let operator = match self.direction {
            SortDirection::Desc => '<',
            SortDirection::Asc => '>',
        };
        format!("{operator}{}", self.request_field)
    }

    fn boundary_of(&self, record: &Record) -> Option<i64> {
        self.record_fields
            .iter()
            .find_map(|field| record.get(field).filter(|value| !value.is_null()))
            .and_then(coerce_int)
            .filter(|key| *key > 0)
    }
}

/// Outcome of absorbing one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Running,
    /// The boundary moved and another page is due.
    Advancing,
    Terminated,
}

/// Per-fetch cursor state; owned by exactly one `fetch_all` call.
#[derive(Debug)]
pub struct CursorRun<'a> {
    method: &'a str,
    plan: &'a CursorPlan,
    page_size: usize,
    cursor: Cursor,
    records: Vec<Record>,
    state: CursorState,
}

impl<'a> CursorRun<'a> {
    pub fn new(method: &'a str, plan: &'a CursorPlan, page_size: usize) -> Self {
        Self {
            method,
            plan,
            page_size,
            cursor: Cursor::new(plan.direction),
            records: Vec::new(),
            state: CursorState::Running,
        }
    }

    pub const fn state(&self) -> CursorState {
        self.state
    }

    pub const fn last_key(&self) -> Option<i64> {
        self.cursor.last_key
    }

    /// Absorb one page and move the state machine.
    ///
    /// # Errors
    /// `RestError::CursorUnavailable` for a non-empty page without a
    /// positive cursor value, `RestError::CursorStall` when the boundary
    /// does not strictly advance.
    pub fn absorb(&mut self, chunk: Vec<Record>) -> Result<CursorState> {
        if chunk.is_empty() {
            self.state = CursorState::Terminated;
            return Ok(self.state);
        }

        let boundary = self
            .cursor
            .extremal(chunk.iter().filter_map(|record| self.plan.boundary_of(record)))
            .ok_or_else(|| RestError::CursorUnavailable {
                method: self.method.to_string(),
                field: self.plan.request_field.clone(),
            })?;

        if !self.cursor.advances_to(boundary) {
            return Err(RestError::CursorStall {
                method: self.method.to_string(),
                previous: self.cursor.last_key.unwrap_or_default(),
                current: boundary,
            });
        }

        let short_page = chunk.len() < self.page_size;
        self.cursor.last_key = Some(boundary);
        self.records.extend(chunk);

        self.state = if self.plan.termination == Termination::ShortPage && short_page {
            CursorState::Terminated
        } else {
            CursorState::Advancing
        };
        Ok(self.state)
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Drives [`CursorRun`] against the remote list method.
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    context: RestContext,
}

impl CursorPaginator {
    pub const fn new(context: RestContext) -> Self {
        Self { context }
    }

    /// Fetch every record `method` returns for `params`.
    ///
    /// Caller `start` values are dropped. Preconditions are checked before
    /// the first call.
    ///
    /// # Errors
    /// `RestError::UsageConflict` when the filter constrains the cursor
    /// field, or the order sorts by it under a client-side order policy.
    /// `RestError::IterationLimitExceeded` past the configured iteration
    /// ceiling, plus every error of [`CursorRun::absorb`] and the call.
    #[instrument(skip(self, params, plan), fields(method = %method, cursor = %plan.request_field))]
    pub async fn fetch_all(
        &self,
        method: &str,
        params: &Params,
        plan: &CursorPlan,
    ) -> Result<Vec<Record>> {
        let mut base = params.clone();
        let filter = take_object(&mut base, plan.param_case.filter_key());
        let order = take_object(&mut base, plan.param_case.order_key());
        base.remove("start");
        base.remove("START");

        if filter_mentions_field(&filter, &[plan.request_field.as_str()]) {
            return Err(RestError::UsageConflict(format!(
                "`{method}` manages the `{}` cursor itself; remove it from the filter",
                plan.request_field
            )));
        }

        let user_order = match plan.order_policy {
            OrderPolicy::ClientSide => output_order(&order, plan),
            OrderPolicy::Fixed => Vec::new(),
        };
        if order_mentions_field(&user_order, &plan.request_field) {
            return Err(RestError::UsageConflict(format!(
                "`{method}` pages by `{}`; remove it from the order",
                plan.request_field
            )));
        }

        let (filter_key, _) = plan.param_case.filter_key();
        let (order_key, _) = plan.param_case.order_key();
        let mut forced_order = Map::new();
        forced_order.insert(plan.request_field.clone(), json!(plan.direction.as_str()));
        base.insert(order_key.to_string(), Value::Object(forced_order));
        base.insert("start".to_string(), json!(START_WITHOUT_COUNT));

        let settings = self.context.settings();
        let list_keys: Vec<&str> = plan.list_keys.iter().map(String::as_str).collect();
        let boundary_key = plan.boundary_key();
        let mut run = CursorRun::new(method, plan, settings.page_size);
        let mut iterations = 0_usize;

        while run.state() != CursorState::Terminated {
            iterations += 1;
            if iterations > settings.max_iterations {
                return Err(RestError::IterationLimitExceeded {
                    method: method.to_string(),
                    limit: settings.max_iterations,
                });
            }

            let mut page_filter = filter.clone();
            if let Some(last) = run.last_key() {
                page_filter.insert(boundary_key.clone(), json!(last));
            }
            let mut request = base.clone();
            request.insert(filter_key.to_string(), Value::Object(page_filter));

            let envelope = self.context.call(method, &request).await?;
            let mut chunk = extract_list(&envelope, &list_keys);
            if let Some(mapper) = plan.record_mapper {
                chunk = chunk.into_iter().map(mapper).collect();
            }

            debug!(iteration = iterations, records = chunk.len(), last = ?run.last_key(), "cursor page");
            run.absorb(chunk)?;
        }

        let mut records = run.into_records();
        sort_records(&mut records, &user_order);

        info!(records = records.len(), iterations, "cursor fetch completed");
        Ok(records)
    }
}

/// Remove both casings of a parameter and merge them; entries under
/// `keys.0` win on collision. Non-objects count as empty.
fn take_object(params: &mut Params, keys: (&str, &str)) -> Map<String, Value> {
    let preferred = params.remove(keys.0);
    let fallback = params.remove(keys.1);

    let mut merged = match fallback {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    if let Some(Value::Object(map)) = preferred {
        merged.extend(map);
    }
    merged
}

fn output_order(order: &Map<String, Value>, plan: &CursorPlan) -> Vec<SortKey> {
    let mut keys = parse_order(order);
    if let Some(mapper) = plan.sort_field_mapper {
        for key in &mut keys {
            key.field = mapper(&key.field);
        }
    }
    keys
}
