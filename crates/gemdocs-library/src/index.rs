//! Library index trait and error types.
//!
//! Provides the core [`LibraryIndex`] trait for package enumeration, search
//! and documentation rendering, along with [`LibraryError`] for unified error
//! handling across backends.
//!
//! # Path Convention
//!
//! The `path` passed to [`LibraryIndex::render`] is the part of the request
//! path below the package, without leading slash:
//! - `""` - package index page
//! - `"Rack/Request"` - class page
//! - `"file/README.md"` - extra file

use std::path::PathBuf;

use crate::package::{LibraryCollection, PackageRef};

/// Per-request rendering constraints.
///
/// Every request starts from [`RenderContext::strict`]. The context is
/// passed by value into each render call and never shared between requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderContext {
    /// Prevent embedded directives in documentation sources from executing.
    pub safe_mode: bool,
}

impl RenderContext {
    /// Strictest sandbox (safe mode on).
    #[must_use]
    pub const fn strict() -> Self {
        Self { safe_mode: true }
    }

    /// Relaxed sandbox (safe mode off).
    #[must_use]
    pub const fn relaxed() -> Self {
        Self { safe_mode: false }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::strict()
    }
}

/// Rendered documentation output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    /// Rendered bytes.
    pub content: Vec<u8>,
    /// MIME type of `content`.
    pub content_type: String,
}

impl Rendered {
    /// Rendered HTML page.
    #[must_use]
    pub fn html(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            content_type: "text/html; charset=utf-8".to_owned(),
        }
    }

    /// True if the content is an HTML page.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type.starts_with("text/html")
    }
}

/// Library index error.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// Package or page below a package does not exist.
    #[error("Not found: {package}/{path}")]
    NotFound {
        /// Package name.
        package: String,
        /// Path below the package.
        path: String,
    },
    /// I/O error while reading the index.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Malformed index data.
    #[error("Invalid library data: {0}")]
    Invalid(String),
}

impl LibraryError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(package: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotFound {
            package: package.into(),
            path: path.into(),
        }
    }

    /// Create an error from an I/O error, mapping `NotFound` to [`LibraryError::NotFound`].
    #[must_use]
    pub fn io(err: std::io::Error, file: PathBuf, package: &str, path: &str) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(package, path)
        } else {
            Self::Io {
                path: file,
                source: err,
            }
        }
    }

    /// True if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Package enumeration, search and rendering.
///
/// Collections returned by the index are owned by the caller; the server
/// never mutates index state.
pub trait LibraryIndex: Send + Sync {
    /// All packages, ordered case-insensitively by name.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError`] if the index cannot be read.
    fn list_all(&self) -> Result<LibraryCollection, LibraryError>;

    /// Packages whose name starts with `letter`.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError`] if the index cannot be read.
    fn bucket_by_letter(&self, letter: char) -> Result<LibraryCollection, LibraryError> {
        Ok(self.list_all()?.of_letter(letter))
    }

    /// Packages matching a free-text query, ordered by relevance.
    ///
    /// The order must be stable across repeated identical queries.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError`] if the index cannot be read.
    fn search(&self, query: &str) -> Result<LibraryCollection, LibraryError> {
        Ok(self.list_all()?.matching(query))
    }

    /// Resolve a package by name.
    ///
    /// Returns `Ok(None)` if the index has no such package.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError`] if the index cannot be read.
    fn package(&self, name: &str) -> Result<Option<PackageRef>, LibraryError>;

    /// Render documentation for `path` below `package`.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::NotFound`] if the page does not exist, or
    /// another [`LibraryError`] if rendering fails.
    fn render(
        &self,
        package: &PackageRef,
        path: &str,
        ctx: &RenderContext,
    ) -> Result<Rendered, LibraryError>;
}

/// No-op [`LibraryIndex`] used when the library integration is disabled.
///
/// The collection is always empty and every package is absent, so all
/// package-scoped routes degrade to not found.
#[derive(Debug, Default)]
pub struct NullLibraryIndex;

impl LibraryIndex for NullLibraryIndex {
    fn list_all(&self) -> Result<LibraryCollection, LibraryError> {
        Ok(LibraryCollection::default())
    }

    fn package(&self, _name: &str) -> Result<Option<PackageRef>, LibraryError> {
        Ok(None)
    }

    fn render(
        &self,
        package: &PackageRef,
        path: &str,
        _ctx: &RenderContext,
    ) -> Result<Rendered, LibraryError> {
        Err(LibraryError::not_found(&package.name, path))
    }
}
