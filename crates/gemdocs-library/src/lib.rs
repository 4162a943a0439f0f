//! Library index abstraction for the gemdocs documentation server.
//!
//! This crate provides a [`LibraryIndex`] trait for abstracting package
//! enumeration, search and documentation rendering from the server. This
//! enables:
//!
//! - **Unit testing** of routing without a real documentation tree
//! - **Backend flexibility** (pre-rendered trees on disk, live renderers)
//! - **Clean separation** between request routing and package metadata
//!
//! # Architecture
//!
//! The crate provides:
//! - [`PackageRef`] and [`LibraryCollection`]: package metadata and ordered views
//! - [`LibraryIndex`] trait with `list_all()`, `bucket_by_letter()`, `search()`,
//!   `package()` and `render()`
//! - [`paginate`]: page windows over a collection
//! - [`FsLibraryIndex`]: pre-rendered documentation trees on disk
//! - [`NullLibraryIndex`]: used when the library integration is disabled
//! - [`MockLibraryIndex`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use gemdocs_library::{FsLibraryIndex, LibraryIndex, paginate};
//!
//! let index = FsLibraryIndex::new(PathBuf::from("libraries"));
//! let bucket = index.bucket_by_letter('r')?;
//! let page = paginate(&bucket, 1, 100);
//! for package in &page.items {
//!     println!("{}", package.name);
//! }
//! ```

mod fs;
mod index;
#[cfg(feature = "mock")]
mod mock;
mod package;
mod pager;

pub use fs::FsLibraryIndex;
pub use index::{LibraryError, LibraryIndex, NullLibraryIndex, RenderContext, Rendered};
#[cfg(feature = "mock")]
pub use mock::{MockLibraryIndex, RenderCall};
pub use package::{LibraryCollection, PackageRef};
pub use pager::{Page, paginate, total_pages};
