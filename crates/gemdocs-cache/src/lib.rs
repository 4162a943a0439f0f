//! Rendered page cache for gemdocs.
//!
//! Maps a normalized request path to a previously rendered page on disk.
//! The [`PageCache`] trait decouples the server from the storage mechanism:
//!
//! - [`NullPageCache`]: No-op implementation used when caching is disabled
//! - [`FilePageCache`]: One file per request path under a public directory
//!
//! Static asset paths are never served from the page cache; they go through
//! a separate pass-through that only sets freshness metadata.
//!
//! # Example
//!
//! ```
//! use gemdocs_cache::{NullPageCache, PageCache};
//!
//! let cache = NullPageCache;
//! let html = cache.store("/gems/rails", b"<html>rails</html>".to_vec());
//! assert_eq!(html, b"<html>rails</html>");
//! assert!(cache.lookup("/gems/rails").is_none()); // NullPageCache always misses
//! ```

mod file;
pub use file::FilePageCache;

use std::time::SystemTime;

/// Key used for the empty request path.
pub const INDEX_KEY: &str = "index";

/// Leading path segment of static assets.
const STATIC_PREFIX: &str = "static";

/// A previously rendered page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    /// Normalized cache key (see [`cache_key`]).
    pub path: String,
    /// Rendered bytes, exactly as stored.
    pub content: Vec<u8>,
    /// Time the artifact was written.
    pub written_at: SystemTime,
}

/// Cache of rendered pages keyed by request path.
pub trait PageCache: Send + Sync {
    /// Whether this cache stores anything at all.
    fn is_enabled(&self) -> bool;

    /// Look up the artifact for a request path.
    ///
    /// Returns `None` if caching is disabled, the path is a static asset path
    /// or is not cacheable, or no artifact exists.
    ///
    /// # Arguments
    ///
    /// * `path` - Request path (e.g., "/", "/gems/~r/2")
    fn lookup(&self, path: &str) -> Option<CacheEntry>;

    /// Persist rendered content for a request path and hand it back.
    ///
    /// Does nothing if caching is disabled, `content` is empty, or the path is
    /// not cacheable. Write failures are logged and never reach the caller.
    ///
    /// # Arguments
    ///
    /// * `path` - Request path (e.g., "/", "/gems/~r/2")
    /// * `content` - Rendered bytes
    fn store(&self, path: &str, content: Vec<u8>) -> Vec<u8>;
}

/// Normalize a request path into a cache key.
///
/// Leading and trailing separators are stripped and the empty path maps to
/// [`INDEX_KEY`]. Returns `None` for paths that must not be cached: static
/// asset paths and paths with empty, `.` or `..` segments, backslashes or NUL
/// bytes, none of which can name a file below the public directory.
#[must_use]
pub fn cache_key(path: &str) -> Option<String> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Some(INDEX_KEY.to_owned());
    }
    if is_static_path(trimmed) {
        return None;
    }

    let valid = trimmed
        .split('/')
        .all(|s| !s.is_empty() && s != "." && s != ".." && !s.contains(['\\', '\0']));
    valid.then(|| trimmed.to_owned())
}

/// True if `path` names a static asset.
#[must_use]
pub fn is_static_path(path: &str) -> bool {
    let trimmed = path.trim_start_matches('/');
    trimmed == STATIC_PREFIX
        || trimmed
            .strip_prefix(STATIC_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// No-op [`PageCache`] used when caching is disabled.
///
/// Every `lookup` misses; every `store` returns its content untouched.
#[derive(Debug, Default)]
pub struct NullPageCache;

impl PageCache for NullPageCache {
    fn is_enabled(&self) -> bool {
        false
    }

    fn lookup(&self, _path: &str) -> Option<CacheEntry> {
        None
    }

    fn store(&self, _path: &str, content: Vec<u8>) -> Vec<u8> {
        content
    }
}
