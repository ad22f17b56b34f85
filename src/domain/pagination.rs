//! History pagination

use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A normalized page request.
///
/// Non-positive inputs fall back to the defaults instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: if page <= 0 { DEFAULT_PAGE } else { page },
            page_size: if page_size <= 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    /// Rows to skip
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Rows to return
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_non_positive_values() {
        assert_eq!(PageRequest::new(0, 0), PageRequest::new(1, 10));
        assert_eq!(PageRequest::new(-3, -1), PageRequest::new(1, 10));
    }

    #[test]
    fn test_positive_values_kept() {
        let page = PageRequest::new(3, 25);
        assert_eq!(page.page, 3);
        assert_eq!(page.page_size, 25);
    }

    #[test]
    fn test_offset_and_limit() {
        let first = PageRequest::new(1, 10);
        assert_eq!(first.offset(), 0);
        assert_eq!(first.limit(), 10);

        let third = PageRequest::new(3, 5);
        assert_eq!(third.offset(), 10);
        assert_eq!(third.limit(), 5);
    }

    #[test]
    fn test_offset_saturates() {
        let page = PageRequest::new(i64::MAX, i64::MAX);
        assert_eq!(page.offset(), i64::MAX);
    }
}
