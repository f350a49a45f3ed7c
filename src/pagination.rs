//! Pagination for list endpoints served by the mock server.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Default number of items per page.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Upper bound for `per_page`.
pub const MAX_PER_PAGE: usize = 100;

/// A page of results.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Current page number (1-indexed).
    pub page: usize,
    /// Number of items per page.
    pub per_page: usize,
}

impl<T> Page<T> {
    /// Whether there are pages after this one.
    pub fn has_more(&self) -> bool {
        (self.page as u64).saturating_mul(self.per_page as u64) < self.total
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// The `meta` object list endpoints attach to their payload.
    pub fn meta(&self) -> Value {
        let next_page = self
            .has_more()
            .then(|| format!("?page={}&per_page={}", self.page + 1, self.per_page));
        let prev_page = (self.page > 1)
            .then(|| format!("?page={}&per_page={}", self.page - 1, self.per_page));

        json!({
            "total": self.total,
            "next_page": next_page,
            "prev_page": prev_page,
        })
    }
}

/// Query parameters for paginated requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-indexed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    /// Number of items per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<usize>,
}

impl PaginationParams {
    /// Read `page` and `per_page` from query parameters, ignoring junk.
    pub fn from_query(page: Option<&str>, per_page: Option<&str>) -> Self {
        Self {
            page: page.and_then(|p| p.parse().ok()),
            per_page: per_page.and_then(|p| p.parse().ok()),
        }
    }

    /// Cut the requested page out of `items`.
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let total = items.len() as u64;
        let start = (page - 1).saturating_mul(per_page);

        let items = items.into_iter().skip(start).take(per_page).collect();

        Page {
            items,
            total,
            page,
            per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_first_page() {
        let page = PaginationParams::default().paginate((1..=25).collect::<Vec<_>>());
        assert_eq!(page.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(page.total, 25);
        assert!(page.has_more());
    }

    #[test]
    fn test_paginate_last_page() {
        let params = PaginationParams::from_query(Some("3"), Some("10"));
        let page = params.paginate((1..=25).collect::<Vec<_>>());
        assert_eq!(page.items, (21..=25).collect::<Vec<_>>());
        assert!(!page.has_more());
    }

    #[test]
    fn test_paginate_past_the_end() {
        let params = PaginationParams::from_query(Some("9"), None);
        let page = params.paginate(vec![1, 2, 3]);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_junk_query_falls_back_to_defaults() {
        let params = PaginationParams::from_query(Some("abc"), Some("0"));
        assert_eq!(params.page, None);
        let page = params.paginate((1..=5).collect::<Vec<_>>());
        // per_page=0 is clamped to 1
        assert_eq!(page.items, vec![1]);
    }

    #[test]
    fn test_meta_links() {
        let params = PaginationParams::from_query(Some("2"), Some("2"));
        let meta = params.paginate(vec![1, 2, 3, 4, 5]).meta();
        assert_eq!(meta["total"], 5);
        assert_eq!(meta["next_page"], "?page=3&per_page=2");
        assert_eq!(meta["prev_page"], "?page=1&per_page=2");
    }

    #[test]
    fn test_page_map() {
        let page = PaginationParams::default().paginate(vec![1, 2, 3]);
        let mapped = page.map(|x| x * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.page, 1);
    }
}
