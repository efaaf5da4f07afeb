//! Page/limit arithmetic for list endpoints

use serde::{Deserialize, Serialize};

/// Default page size when the client does not send `limit`
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size a client may request
pub const MAX_LIMIT: u32 = 100;

/// Pagination parameters for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub limit: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters, clamping out-of-range values
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Build from optional query values, applying defaults
    pub fn from_query(page: Option<u32>, limit: Option<u32>) -> Self {
        Self::new(page.unwrap_or(1), limit.unwrap_or(DEFAULT_LIMIT))
    }

    /// Row offset for the current page
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.limit as i64
    }

    /// Row limit for the current page
    pub fn limit(&self) -> i64 {
        self.limit as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub params: ListParams,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: i64, params: ListParams) -> Self {
        Self {
            items,
            total,
            params,
        }
    }

    /// Number of pages needed to hold `total` items
    pub fn total_pages(&self) -> i64 {
        let limit = self.params.limit as i64;
        (self.total.max(0) + limit - 1) / limit
    }

    /// Pagination block as rendered in list responses
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.params.page,
            limit: self.params.limit,
            total: self.total,
            total_pages: self.total_pages(),
        }
    }
}

/// `pagination` object of list responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// total_pages is ceil(total / limit).
        #[test]
        fn total_pages_is_ceiling(total in 0i64..10_000, page in 1u32..50, limit in 1u32..=100) {
            let result: PagedResult<()> = PagedResult::new(vec![], total, ListParams::new(page, limit));
            let expected = (total as f64 / limit as f64).ceil() as i64;
            prop_assert_eq!(result.total_pages(), expected);
        }
    }
}
