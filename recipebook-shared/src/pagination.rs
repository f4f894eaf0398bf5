/// Page-number pagination for list endpoints
///
/// Lists are addressed with a 1-based `page` and a `limit` (page size).
/// Responses use a `{count, results}` envelope where `count` is the total
/// number of matching rows across all pages.

use serde::Serialize;

/// Hard cap on `limit` so a client cannot ask for the whole table
pub const MAX_PAGE_SIZE: i64 = 100;

/// A resolved page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: i64,

    /// Page size
    pub limit: i64,
}

impl PageRequest {
    /// Resolves optional query parameters against a default page size
    ///
    /// Missing or non-positive values fall back to page 1 and
    /// `default_limit`; `limit` is clamped to [`MAX_PAGE_SIZE`].
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(default_limit)
            .clamp(1, MAX_PAGE_SIZE);

        Self { page, limit }
    }

    /// Row offset of the first item on this page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    /// Total matching rows
    pub count: i64,

    /// Items on the requested page
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(count: i64, results: Vec<T>) -> Self {
        Self { count, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PageRequest::new(None, None, 6);
        assert_eq!(page, PageRequest { page: 1, limit: 6 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_offset() {
        let page = PageRequest::new(Some(3), Some(10), 6);
        assert_eq!(page.offset(), 20);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let page = PageRequest::new(Some(0), Some(-5), 6);
        assert_eq!(page, PageRequest { page: 1, limit: 6 });
    }

    #[test]
    fn test_limit_is_clamped() {
        let page = PageRequest::new(Some(1), Some(10_000), 6);
        assert_eq!(page.limit, MAX_PAGE_SIZE);
    }
}
