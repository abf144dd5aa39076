//! Offset pagination for methods that only understand `start`/`next`

use b24rest_domain::{ListPage, Pagination, Params, Record, RestError, Result};
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::context::RestContext;
use crate::response::extract_list_response;

/// Walks `start` offsets by following the server's `next` hint.
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    context: RestContext,
}

impl OffsetPaginator {
    pub const fn new(context: RestContext) -> Self {
        Self { context }
    }

    /// Fetch every page from offset 0 until `next` disappears.
    ///
    /// # Errors
    /// `RestError::CursorStall` when `next` does not move past the current
    /// offset, `RestError::IterationLimitExceeded` past the iteration
    /// ceiling, plus any call error.
    #[instrument(skip(self, params, list_keys), fields(method = %method))]
    pub async fn fetch_all(
        &self,
        method: &str,
        params: &Params,
        list_keys: &[&str],
    ) -> Result<Vec<Record>> {
        let mut base = params.clone();
        base.remove("START");

        let max_iterations = self.context.settings().max_iterations;
        let mut records = Vec::new();
        let mut start = 0_i64;
        let mut iterations = 0_usize;

        loop {
            iterations += 1;
            if iterations > max_iterations {
                return Err(RestError::IterationLimitExceeded {
                    method: method.to_string(),
                    limit: max_iterations,
                });
            }

            let mut request = base.clone();
            request.insert("start".to_string(), json!(start));
            let envelope = self.context.call(method, &request).await?;
            let page = extract_list_response(&envelope, list_keys);
            debug!(start, records = page.items.len(), next = ?page.next, "offset page");
            records.extend(page.items);

            let Some(next) = page.next else {
                break;
            };
            if next <= start {
                return Err(RestError::CursorStall {
                    method: method.to_string(),
                    previous: start,
                    current: next,
                });
            }
            start = next;
        }

        info!(records = records.len(), iterations, "offset fetch completed");
        Ok(records)
    }

    /// Fetch one 1-based page of `page_size` records.
    ///
    /// # Errors
    /// `RestError::InvalidInput` for page 0, plus any call error.
    #[instrument(skip(self, params, list_keys), fields(method = %method))]
    pub async fn fetch_page(
        &self,
        method: &str,
        params: &Params,
        page: usize,
        list_keys: &[&str],
    ) -> Result<ListPage> {
        if page == 0 {
            return Err(RestError::InvalidInput("page must be 1 or greater".to_string()));
        }

        let page_size = self.context.settings().page_size;
        let start = (page - 1).saturating_mul(page_size);

        let mut request = params.clone();
        request.remove("START");
        request.insert("start".to_string(), json!(start));

        let envelope = self.context.call(method, &request).await?;
        let response = extract_list_response(&envelope, list_keys);
        let pagination = Pagination::compute(page, page_size, response.total, response.next);

        Ok(ListPage { items: response.items, pagination })
    }
}
