//! Domain models for the storefront.
//!
//! Row types derive `sqlx::FromRow` and serialize to the camelCase JSON the
//! storefront and back-office clients consume. JSON columns are mapped with
//! `#[sqlx(json)]` so handlers work with plain Rust types.

pub mod blog;
pub mod bundle;
pub mod cart;
pub mod catalog;
pub mod compliance;
pub mod content;
pub mod coupon;
pub mod order;
pub mod user;

use serde::Serialize;

/// A page of results with the total row count.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Normalized page/limit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Largest page size a client may request.
    pub const MAX_LIMIT: i64 = 100;

    /// Highest page number honored; later pages are simply empty.
    pub const MAX_PAGE: i64 = 1_000_000;

    /// Clamp raw query values: page is 1..=1_000_000, limit is 1..=100.
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, Self::MAX_PAGE),
            limit: limit.unwrap_or(default_limit).clamp(1, Self::MAX_LIMIT),
        }
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).max(0).saturating_mul(self.limit)
    }

    #[must_use]
    pub fn wrap<T>(self, data: Vec<T>, total: i64) -> Paginated<T> {
        Paginated {
            data,
            total,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(Some(0), Some(500), 20);
        assert_eq!(req, PageRequest { page: 1, limit: 100 });
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(Some(3), None, 20);
        assert_eq!(req.offset(), 40);
    }

    #[test]
    fn test_huge_page_offset_stays_in_range() {
        let req = PageRequest::new(Some(i64::MAX), Some(100), 20);
        assert_eq!(req.page, PageRequest::MAX_PAGE);
        assert_eq!(req.offset(), 99_999_900);

        let raw = PageRequest {
            page: i64::MAX,
            limit: 100,
        };
        assert_eq!(raw.offset(), i64::MAX);

        let raw = PageRequest {
            page: i64::MIN,
            limit: 100,
        };
        assert_eq!(raw.offset(), 0);
    }
}
