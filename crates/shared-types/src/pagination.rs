//! # Pagination
//!
//! 1-based page requests and the page envelope returned by every list
//! operation.

use serde::{Deserialize, Serialize};

/// Default page size for storefront listings.
pub const DEFAULT_PER_PAGE: u32 = 24;

/// Largest page a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// A normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Items per page, within `1..=MAX_PER_PAGE`.
    pub per_page: u32,
}

impl PageRequest {
    /// Build a request from optional caller input, clamping out-of-range values.
    #[must_use]
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Number of items to skip.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.per_page as usize
    }

    /// Slice an already filtered and sorted collection.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(self.offset())
            .take(self.per_page as usize)
            .collect();
        Page {
            items,
            total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of matching items across all pages.
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    /// An empty page for the given request.
    #[must_use]
    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: request.page,
            per_page: request.per_page,
        }
    }

    /// Number of pages needed to show `total` items.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.per_page.max(1)))
    }

    /// Transform the items, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        assert_eq!(PageRequest::default().per_page, DEFAULT_PER_PAGE);
        assert_eq!(PageRequest::new(Some(0), Some(0)).page, 1);
        assert_eq!(PageRequest::new(None, Some(0)).per_page, 1);
        assert_eq!(PageRequest::new(None, Some(5000)).per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_paginate() {
        let request = PageRequest::new(Some(3), Some(4));
        let page = request.paginate((1..=10).collect::<Vec<_>>());
        assert_eq!(page.items, vec![9, 10]);
        assert_eq!(page.total, 10);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = PageRequest::new(Some(9), Some(10)).paginate(vec!['a', 'b']);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 2);
    }
}
