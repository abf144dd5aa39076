//! List responses, page metadata and cursor state

use serde::{Deserialize, Serialize};

use super::{Record, SortDirection};

/// Normalized list payload of one list call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    /// Items in the server's natural order for the request.
    pub items: Vec<Record>,
    pub next: Option<i64>,
    pub total: Option<i64>,
}

/// Page metadata returned by single-page list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total: Option<i64>,
    pub total_pages: Option<i64>,
    pub has_next: bool,
}

impl Pagination {
    /// Derive page metadata from the `total`/`next` hints of a response.
    pub fn compute(page: usize, page_size: usize, total: Option<i64>, next: Option<i64>) -> Self {
        let size = i64::try_from(page_size.max(1)).unwrap_or(i64::MAX);
        let total_pages = total.map(|t| (t.max(0) + size - 1) / size);
        let current = i64::try_from(page).unwrap_or(i64::MAX);
        let has_next = next.is_some() || total_pages.is_some_and(|pages| current < pages);

        Self { page, page_size, total, total_pages, has_next }
    }
}

/// One page of records plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    pub items: Vec<Record>,
    pub pagination: Pagination,
}

/// Monotonic key cursor used by exhaustive fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub last_key: Option<i64>,
    pub direction: SortDirection,
}

impl Cursor {
    pub const fn new(direction: SortDirection) -> Self {
        Self { last_key: None, direction }
    }

    /// Whether `candidate` moves strictly past the last boundary.
    pub const fn advances_to(&self, candidate: i64) -> bool {
        match (self.last_key, self.direction) {
            (None, _) => true,
            (Some(last), SortDirection::Desc) => candidate < last,
            (Some(last), SortDirection::Asc) => candidate > last,
        }
    }

    /// Pick the boundary of a page: minimum when descending, maximum when
    /// ascending.
    pub fn extremal(&self, keys: impl IntoIterator<Item = i64>) -> Option<i64> {
        let keys = keys.into_iter();
        match self.direction {
            SortDirection::Desc => keys.min(),
            SortDirection::Asc => keys.max(),
        }
    }
}
