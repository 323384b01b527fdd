//! Page request/response contract shared by every list endpoint
//!
//! Requests carry `page` (1-based) and `per_page`; responses carry the page of
//! items plus `total` and/or `pages`. When only `total` is given the page count
//! is `ceil(total / per_page)`, and it is never less than 1.

use serde::{Deserialize, Serialize};

/// Upper bound the server applies to `per_page`
pub const MAX_PER_PAGE: u32 = 200;

// Default page sizes per list view
pub const MEMBERS_PER_PAGE: u32 = 50;
pub const VERIFICATIONS_PER_PAGE: u32 = 20;
pub const CORRECTIONS_PER_PAGE: u32 = 20;
pub const SEARCH_LOGS_PER_PAGE: u32 = 50;

/// Raw page parameters as they arrive in a query string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl PageParams {
    /// Clamp to `page >= 1` and `1 <= per_page <= MAX_PER_PAGE`
    pub fn resolve(&self, default_per_page: u32) -> Page {
        Page {
            page: self.page.unwrap_or(1).max(1),
            per_page: self
                .per_page
                .unwrap_or(default_per_page)
                .clamp(1, MAX_PER_PAGE),
        }
    }
}

/// A clamped page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// `ceil(total / per_page)`, minimum 1
pub fn total_pages(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    let pages = total.div_ceil(per_page).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Page count from whatever the response carried: `pages` wins over `total`
pub fn resolve_total_pages(total: Option<u64>, pages: Option<u32>, per_page: u32) -> u32 {
    match (pages, total) {
        (Some(pages), _) => pages.max(1),
        (None, Some(total)) => total_pages(total, per_page),
        (None, None) => 1,
    }
}

/// A list response that carries one page of items
pub trait PageResponse {
    type Item;

    fn items(&self) -> &[Self::Item];
    fn into_items(self) -> Vec<Self::Item>;
    fn total(&self) -> Option<u64>;
    fn pages(&self) -> Option<u32>;

    fn total_pages(&self, per_page: u32) -> u32 {
        resolve_total_pages(self.total(), self.pages(), per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(120, 50), 3);
        assert_eq!(total_pages(100, 50), 2);
        assert_eq!(total_pages(1, 50), 1);
    }

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0, 50), 1);
        assert_eq!(total_pages(10, 0), 10);
    }

    #[test]
    fn explicit_pages_take_precedence() {
        assert_eq!(resolve_total_pages(Some(120), Some(7), 50), 7);
        assert_eq!(resolve_total_pages(Some(120), None, 50), 3);
        assert_eq!(resolve_total_pages(None, Some(0), 50), 1);
        assert_eq!(resolve_total_pages(None, None, 50), 1);
    }

    #[test]
    fn params_are_clamped() {
        let page = PageParams {
            page: Some(0),
            per_page: Some(10_000),
        }
        .resolve(50);
        assert_eq!(page, Page { page: 1, per_page: MAX_PER_PAGE });

        let page = PageParams::default().resolve(20);
        assert_eq!(page, Page { page: 1, per_page: 20 });

        let page = PageParams {
            page: Some(3),
            per_page: Some(50),
        }
        .resolve(20);
        assert_eq!(page.offset(), 100);
        assert_eq!(page.limit(), 50);
    }
}
