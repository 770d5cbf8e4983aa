//! Shared pagination types for API query parameters.
//!
//! List endpoints page with a 1-based `page` parameter and a fixed page size. A page past the
//! end of the result set is reported as not found, matching how the list views have always
//! behaved; an empty result set still has one (empty) page.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

use crate::errors::{Error, Result};

/// Number of items on every page.
pub const PAGE_SIZE: i64 = 10;

/// Page selection for list endpoints.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct Pagination {
    /// 1-based page number (default: 1)
    #[param(default = 1, minimum = 1)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<i64>,
}

/// A resolved page: which rows to fetch and how the result is numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub num_pages: i64,
    pub skip: i64,
    pub limit: i64,
}

/// Number of pages needed for `total_count` items, never less than one.
pub fn num_pages(total_count: i64) -> i64 {
    ((total_count + PAGE_SIZE - 1) / PAGE_SIZE).max(1)
}

impl Pagination {
    /// Get the requested page, defaulting to 1.
    #[inline]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    /// Resolve the requested page against the number of matching items.
    pub fn window(&self, total_count: i64) -> Result<PageWindow> {
        let page = self.page();
        let num_pages = num_pages(total_count);

        if page < 1 || page > num_pages {
            return Err(Error::NotFound {
                resource: "Page".to_string(),
                id: page.to_string(),
            });
        }

        Ok(PageWindow {
            page,
            num_pages,
            skip: (page - 1) * PAGE_SIZE,
            limit: PAGE_SIZE,
        })
    }
}

/// Generic paginated response wrapper for list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T: ToSchema> {
    /// The items on this page
    pub data: Vec<T>,
    /// Total number of items matching the query (before pagination)
    pub total_count: i64,
    /// This page's number, starting at 1
    pub page: i64,
    /// Items per page
    pub page_size: i64,
    /// Number of pages available, at least 1
    pub num_pages: i64,
}

impl<T: ToSchema> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total_count: i64, window: PageWindow) -> Self {
        Self {
            data,
            total_count,
            page: window.page,
            page_size: window.limit,
            num_pages: window.num_pages,
        }
    }
}
