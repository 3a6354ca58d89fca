//! Query and pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Upper bound on `limit` regardless of what the caller asks for.
pub const MAX_LIMIT: u32 = 100;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

/// Common list parameters: search, sort, order, page, limit, include_deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring matched against name fields.
    #[serde(default)]
    pub search: Option<String>,
    /// Column to sort by. Each listing whitelists its own columns.
    #[serde(default)]
    pub sort: Option<String>,
    /// Sort direction.
    #[serde(default)]
    pub order: SortOrder,
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Include soft-deleted rows.
    #[serde(default)]
    pub include_deleted: bool,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: None,
            order: SortOrder::default(),
            page: default_page(),
            limit: default_limit(),
            include_deleted: false,
        }
    }
}

impl ListQuery {
    /// Page number clamped to at least 1.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Page size clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    /// Trimmed, non-empty search term.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if total == 0 {
            1
        } else {
            total.div_ceil(u64::from(limit.max(1)))
        };

        Self {
            data,
            meta: PageMeta {
                page,
                limit,
                total,
                total_pages,
            },
        }
    }

    /// Maps the page items, keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let q = ListQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 20);
        assert_eq!(q.offset(), 0);
        assert_eq!(q.order, SortOrder::Desc);
        assert!(!q.include_deleted);
    }

    #[rstest]
    #[case(0, 20, 0)]
    #[case(1, 20, 0)]
    #[case(3, 20, 40)]
    #[case(2, 500, 100)]
    fn test_offset(#[case] page: u32, #[case] limit: u32, #[case] expected: u64) {
        let q = ListQuery {
            page,
            limit,
            ..ListQuery::default()
        };
        assert_eq!(q.offset(), expected);
    }

    #[rstest]
    #[case(0, 1, 1)]
    #[case(20, 20, 1)]
    #[case(21, 20, 2)]
    #[case(101, 10, 11)]
    fn test_total_pages(#[case] total: u64, #[case] limit: u32, #[case] expected: u64) {
        let page: PageResponse<()> = PageResponse::new(vec![], 1, limit, total);
        assert_eq!(page.meta.total_pages, expected);
    }

    #[test]
    fn test_search_term_trims() {
        let q = ListQuery {
            search: Some("   ".into()),
            ..ListQuery::default()
        };
        assert_eq!(q.search_term(), None);

        let q = ListQuery {
            search: Some("  dior ".into()),
            ..ListQuery::default()
        };
        assert_eq!(q.search_term(), Some("dior"));
    }

    #[test]
    fn test_order_deserializes_lowercase() {
        let q: ListQuery = serde_json::from_str(r#"{"order":"asc","include_deleted":true}"#).unwrap();
        assert_eq!(q.order, SortOrder::Asc);
        assert!(q.include_deleted);
    }
}
