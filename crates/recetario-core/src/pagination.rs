//! Page request normalization and page envelopes.
//!
//! Raw page/limit values arrive as untrusted query-string text. They are
//! normalized here, never rejected: a missing or malformed value falls back
//! to the default, and out-of-range values are clamped.

use serde::{Deserialize, Serialize};

use crate::defaults::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::models::RecipeSummary;

/// A normalized page request. `page >= 1` and `1 <= limit <= 100` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Normalize already-parsed values.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.unwrap_or(DEFAULT_PAGE).max(1);
        let limit = limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        Self { page, limit }
    }

    /// Normalize raw query-string values.
    ///
    /// Anything that is not a base-10 integer counts as absent.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(page.and_then(parse_int), limit.and_then(parse_int))
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of matching items preceding this page.
    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Number of pages needed for `total` items at `limit` per page.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// One page of results plus the metadata needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
#[aliases(RecipeResultsPage = Paginated<RecipeSummary>)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, request: &PageRequest) -> Self {
        Self {
            data,
            total,
            page: request.page(),
            limit: request.limit(),
            total_pages: total_pages(total, request.limit()),
        }
    }

    /// A page with no data and no matches.
    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }
}
