//! Paginated result sets.
//!
//! The catalog API returns Spring-style page envelopes:
//!
//! ```json
//! { "content": [...], "totalElements": 5, "totalPages": 1,
//!   "number": 0, "size": 9, "pageable": { "pageNumber": 0 } }
//! ```
//!
//! [`PageEnvelope`] is that wire shape; [`Page`] is what the rest of the
//! workspace works with.

use serde::{Deserialize, Serialize};

/// One slice of a larger result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    from = "PageEnvelope<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u32,
    /// 0-based index of this page.
    pub current_page_index: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Build a page, deriving `total_pages` from the totals.
    #[must_use]
    pub fn new(items: Vec<T>, total_items: u64, current_page_index: u32, page_size: u32) -> Self {
        Self {
            items,
            total_items,
            total_pages: expected_total_pages(total_items, page_size),
            current_page_index,
            page_size,
        }
    }

    /// 1-based page number for pagination controls.
    #[must_use]
    pub const fn displayed_page(&self) -> u32 {
        self.current_page_index + 1
    }

    /// Whether `total_pages` and `current_page_index` agree with the totals.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.page_size == 0 {
            return true;
        }
        self.total_pages == expected_total_pages(self.total_items, self.page_size)
            && (self.total_pages == 0 || self.current_page_index < self.total_pages)
    }
}

/// `ceil(total_items / page_size)`, or 0 when `page_size` is 0.
#[must_use]
pub fn expected_total_pages(total_items: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total_items.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

/// Pagination details nested in the wire envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pageable {
    pub page_number: u32,
}

/// The page envelope as sent by the catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    #[serde(default)]
    pub number: Option<u32>,
    pub size: u32,
    #[serde(default)]
    pub pageable: Option<Pageable>,
}

impl<T> From<PageEnvelope<T>> for Page<T> {
    fn from(envelope: PageEnvelope<T>) -> Self {
        let current_page_index = envelope
            .number
            .or(envelope.pageable.map(|p| p.page_number))
            .unwrap_or(0);
        Self {
            items: envelope.content,
            total_items: envelope.total_elements,
            total_pages: envelope.total_pages,
            current_page_index,
            page_size: envelope.size,
        }
    }
}

impl<T> From<Page<T>> for PageEnvelope<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            content: page.items,
            total_elements: page.total_items,
            total_pages: page.total_pages,
            number: Some(page.current_page_index),
            size: page.page_size,
            pageable: Some(Pageable {
                page_number: page.current_page_index,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_is_ceiling_division() {
        assert_eq!(expected_total_pages(0, 9), 0);
        assert_eq!(expected_total_pages(5, 9), 1);
        assert_eq!(expected_total_pages(9, 9), 1);
        assert_eq!(expected_total_pages(10, 9), 2);
        assert_eq!(expected_total_pages(10, 0), 0);
    }

    #[test]
    fn test_envelope_maps_to_page() {
        let json = r#"{
            "content": [1, 2, 3, 4, 5],
            "totalElements": 5,
            "totalPages": 1,
            "number": 0,
            "size": 9,
            "pageable": {"pageNumber": 0}
        }"#;
        let page: Page<u8> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.displayed_page(), 1);
        assert!(page.is_consistent());
    }

    #[test]
    fn test_page_number_falls_back_to_pageable() {
        let json = r#"{"content": [], "totalElements": 30, "totalPages": 4,
                       "size": 9, "pageable": {"pageNumber": 2}}"#;
        let page: Page<u8> = serde_json::from_str(json).unwrap();
        assert_eq!(page.current_page_index, 2);
        assert_eq!(page.displayed_page(), 3);
    }

    #[test]
    fn test_inconsistent_page_is_detected() {
        let mut page = Page::new(vec![1], 10, 1, 9);
        assert!(page.is_consistent());
        page.current_page_index = 2;
        assert!(!page.is_consistent());
    }
}
