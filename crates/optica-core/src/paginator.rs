//! # Paginator
//!
//! Page-window state for a filtered listing.
//!
//! ```text
//!   total = 25, size = 10
//!
//!   index 0        index 1        index 2
//!   [ 0 ..  9 ]    [10 .. 19]     [20 .. 24]     page_count = 3
//! ```
//!
//! Invariants: `1 <= size <= MAX_PAGE_SIZE`, `page_count = max(1, ceil(total / size))`,
//! `index < page_count`. Navigation clamps instead of failing.

use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Summary of the current window, for the footer line of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PageInfo {
    pub index: usize,
    pub size: usize,
    pub page_count: usize,
    pub total: usize,
    /// Position of the first row shown (0 when the listing is empty).
    pub start: usize,
    /// Position one past the last row shown.
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    index: usize,
    size: usize,
    total: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Paginator::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// New paginator on page 0. The size is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(size: usize) -> Self {
        Paginator {
            index: 0,
            size: size.clamp(1, MAX_PAGE_SIZE),
            total: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.size).max(1)
    }

    /// Re-syncs with the upstream length. Any change of length returns to
    /// the first page; an unchanged length keeps the position.
    pub fn sync_total(&mut self, total: usize) {
        if total != self.total {
            self.total = total;
            self.index = 0;
        }
        self.clamp();
    }

    /// Changes the page size, keeping the index in bounds. Sizes outside
    /// `1..=MAX_PAGE_SIZE` are rejected and leave the paginator untouched.
    pub fn set_size(&mut self, size: usize) -> CoreResult<()> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(CoreError::InvalidPageSize(size));
        }
        self.size = size;
        self.clamp();
        Ok(())
    }

    pub fn go_to(&mut self, index: usize) {
        self.index = index;
        self.clamp();
    }

    pub fn first(&mut self) {
        self.index = 0;
    }

    pub fn previous(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn next(&mut self) {
        self.go_to(self.index.saturating_add(1));
    }

    pub fn last(&mut self) {
        self.index = self.page_count() - 1;
    }

    /// Back to page 0 (search or filter changed).
    pub fn reset(&mut self) {
        self.index = 0;
    }

    fn clamp(&mut self) {
        let last = self.page_count() - 1;
        if self.index > last {
            self.index = last;
        }
    }

    fn bounds(&self, len: usize) -> (usize, usize) {
        let start = self.index.saturating_mul(self.size).min(len);
        let end = start.saturating_add(self.size).min(len);
        (start, end)
    }

    /// The rows of the current page. Empty when out of range.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let (start, end) = self.bounds(items.len());
        &items[start..end]
    }

    pub fn info(&self) -> PageInfo {
        let (start, end) = self.bounds(self.total);
        PageInfo {
            index: self.index,
            size: self.size,
            page_count: self.page_count(),
            total: self.total,
            start,
            end,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn paged(total: usize, size: usize) -> Paginator {
        let mut p = Paginator::new(size);
        p.sync_total(total);
        p
    }

    #[test]
    fn test_twenty_five_records_in_pages_of_ten() {
        let items: Vec<usize> = (0..25).collect();
        let mut p = paged(25, 10);
        assert_eq!(p.page_count(), 3);

        p.last();
        assert_eq!(p.index(), 2);
        assert_eq!(p.slice(&items), &[20, 21, 22, 23, 24]);
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let p = paged(0, 10);
        assert_eq!(p.page_count(), 1);
        assert!(p.slice::<u8>(&[]).is_empty());
        assert_eq!(p.info().start, 0);
    }

    #[test]
    fn test_pages_concatenate_to_whole() {
        let items: Vec<usize> = (0..37).collect();
        for size in 1..=12 {
            let mut p = paged(items.len(), size);
            let mut seen = Vec::new();
            for index in 0..p.page_count() {
                p.go_to(index);
                let page = p.slice(&items);
                assert!(page.len() <= size);
                seen.extend_from_slice(page);
            }
            assert_eq!(seen, items);
        }
    }

    #[test]
    fn test_navigation_clamps() {
        let mut p = paged(25, 10);
        p.previous();
        assert_eq!(p.index(), 0);
        p.next();
        p.next();
        p.next();
        assert_eq!(p.index(), 2);
        p.go_to(99);
        assert_eq!(p.index(), 2);
        p.first();
        assert_eq!(p.index(), 0);
    }

    #[test]
    fn test_set_size_clamps_index() {
        let mut p = paged(25, 5);
        p.last();
        assert_eq!(p.index(), 4);
        p.set_size(20).unwrap();
        assert_eq!(p.index(), 1);
        assert!(matches!(p.set_size(0), Err(CoreError::InvalidPageSize(0))));
        assert_eq!(p.size(), 20);
    }

    #[test]
    fn test_page_size_upper_bound() {
        let mut p = paged(25, 10);
        assert!(p.set_size(MAX_PAGE_SIZE).is_ok());
        assert!(matches!(
            p.set_size(MAX_PAGE_SIZE + 1),
            Err(CoreError::InvalidPageSize(101))
        ));
        assert!(matches!(p.set_size(usize::MAX), Err(CoreError::InvalidPageSize(_))));
        assert_eq!(p.size(), MAX_PAGE_SIZE);

        assert_eq!(Paginator::new(0).size(), 1);
        assert_eq!(Paginator::new(5_000).size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_length_change_resets_to_first_page() {
        let mut p = paged(25, 10);
        p.last();
        p.sync_total(25);
        assert_eq!(p.index(), 2);
        p.sync_total(24);
        assert_eq!(p.index(), 0);
    }

    #[test]
    fn test_slice_out_of_range_is_empty() {
        let mut p = paged(25, 10);
        p.last();
        let shorter: Vec<usize> = (0..5).collect();
        assert!(p.slice(&shorter).is_empty());
    }

    #[test]
    fn test_info_window() {
        let mut p = paged(25, 10);
        p.next();
        let info = p.info();
        assert_eq!((info.start, info.end, info.page_count), (10, 20, 3));
    }
}
