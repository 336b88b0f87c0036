//! Page/page-size normalization shared by every list operation.

use serde::{Deserialize, Serialize};

/// Page used when the caller asks for page zero or below.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the caller asks for zero or fewer items.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size a caller can get; larger requests are clamped.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A normalized page request.
///
/// Construction never fails: out-of-range values fall back to defaults or
/// are clamped, so every `PageRequest` maps to a valid store limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Normalizes raw caller input.
    pub fn new(page: i64, page_size: i64) -> Self {
        let page = if page <= 0 {
            DEFAULT_PAGE
        } else {
            u32::try_from(page).unwrap_or(u32::MAX)
        };
        let page_size = if page_size <= 0 {
            DEFAULT_PAGE_SIZE
        } else if page_size > i64::from(MAX_PAGE_SIZE) {
            MAX_PAGE_SIZE
        } else {
            page_size as u32
        };
        Self { page, page_size }
    }

    /// Returns the 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size, always within `1..=MAX_PAGE_SIZE`.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the store limit for this page.
    pub fn limit(&self) -> usize {
        self.page_size as usize
    }

    /// Returns the number of records to skip.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }

    /// Builds pagination metadata for a result set of `total_items` records.
    pub fn info(&self, total_items: u64) -> PaginationInfo {
        PaginationInfo {
            total_items,
            total_pages: total_pages(total_items, self.page_size),
            current_page: self.page,
            page_size: self.page_size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Number of pages needed for `total_items` at `page_size` per page.
pub fn total_pages(total_items: u64, page_size: u32) -> u64 {
    if total_items == 0 || page_size == 0 {
        return 0;
    }
    total_items.div_ceil(u64::from(page_size))
}

/// Pagination metadata returned alongside a page of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub total_items: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub page_size: u32,
}

/// A page of records plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationInfo,
}

impl<T> Paginated<T> {
    /// Converts every record on the page, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_input_falls_back_to_defaults() {
        assert_eq!(PageRequest::new(0, 0), PageRequest::new(1, 20));
        assert_eq!(PageRequest::new(-3, -10), PageRequest::default());
    }

    #[test]
    fn page_size_is_clamped() {
        let req = PageRequest::new(1, 500);
        assert_eq!(req.page_size(), MAX_PAGE_SIZE);
        assert_eq!(req.limit(), 100);
    }

    #[test]
    fn offset_follows_page() {
        assert_eq!(PageRequest::new(1, 20).offset(), 0);
        assert_eq!(PageRequest::new(3, 25).offset(), 50);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(250, 100), 3);
    }

    #[test]
    fn info_reports_current_page() {
        let info = PageRequest::new(2, 10).info(35);
        assert_eq!(info.total_items, 35);
        assert_eq!(info.total_pages, 4);
        assert_eq!(info.current_page, 2);
        assert_eq!(info.page_size, 10);
    }

    #[test]
    fn info_serializes_camel_case() {
        let json = serde_json::to_value(PageRequest::default().info(3)).unwrap();
        assert_eq!(json["totalItems"], 3);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["pageSize"], 20);
    }
}
