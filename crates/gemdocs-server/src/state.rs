//! Application state.
//!
//! Shared state for all request handlers. Everything here is read-only
//! after startup; the on-disk page cache is the only shared mutable store.

use std::path::PathBuf;
use std::sync::Arc;

use gemdocs_cache::PageCache;
use gemdocs_config::ListingConfig;
use gemdocs_library::LibraryIndex;

use crate::policy::AccessPolicy;
use crate::views::SiteInfo;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Package enumeration, search and rendering.
    pub(crate) library: Arc<dyn LibraryIndex>,
    /// Rendered page cache.
    pub(crate) cache: Arc<dyn PageCache>,
    /// Per-package access lists.
    pub(crate) policy: AccessPolicy,
    /// Site name and URL for page layouts.
    pub(crate) site: SiteInfo,
    /// Page size and featured packages.
    pub(crate) listing: ListingConfig,
    /// Directory static assets are served from.
    pub(crate) public_dir: PathBuf,
}
