//! Page windows over package collections.
//!
//! The caller filters first (alphabetic bucket or search match) and then
//! paginates the filtered collection, so page counts always reflect the
//! filtered set.

use crate::package::{LibraryCollection, PackageRef};

/// One page of a package collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Packages on this page, at most `page_size` of them.
    pub items: Vec<PackageRef>,
    /// Requested page number (1-based, never 0).
    pub page_number: usize,
    /// Total number of pages, at least 1.
    pub total_pages: usize,
    /// Number of packages in the paginated collection.
    pub total_items: usize,
}

impl Page {
    /// True if a page follows this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    /// True if a page precedes this one.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }
}

/// Number of pages needed for `len` items, at least 1 even when empty.
#[must_use]
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Compute the window for `page` over `collection`.
///
/// `page` is clamped to at least 1. A page past the end yields empty
/// `items` while keeping the requested `page_number`, so callers can render
/// a "no further pages" control instead of an error.
#[must_use]
pub fn paginate(collection: &LibraryCollection, page: usize, page_size: usize) -> Page {
    let page_size = page_size.max(1);
    let page_number = page.max(1);
    let total_items = collection.len();

    let items = (page_number - 1)
        .checked_mul(page_size)
        .and_then(|start| collection.as_slice().get(start..))
        .map(|rest| rest.iter().take(page_size).cloned().collect())
        .unwrap_or_default();

    Page {
        items,
        page_number,
        total_pages: total_pages(total_items, page_size),
        total_items,
    }
}
