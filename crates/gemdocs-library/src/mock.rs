//! Mock library index for testing.
//!
//! Provides [`MockLibraryIndex`] for unit testing without filesystem access.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use crate::index::{LibraryError, LibraryIndex, RenderContext, Rendered};
use crate::package::{LibraryCollection, PackageRef};

/// A recorded call to [`LibraryIndex::render`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderCall {
    /// Package name.
    pub package: String,
    /// Path below the package.
    pub path: String,
    /// Safe mode setting the call was made with.
    pub safe_mode: bool,
}

/// Mock library index for testing.
///
/// Stores packages and rendered pages in memory and records every render
/// call. Use the builder methods to configure the mock with test data.
///
/// # Example
///
/// ```ignore
/// use gemdocs_library::{LibraryIndex, MockLibraryIndex, RenderContext};
///
/// let index = MockLibraryIndex::new()
///     .with_package("rack")
///     .with_page("rack", "", "<h1>Rack</h1>");
///
/// let rack = index.package("rack").unwrap().unwrap();
/// let page = index.render(&rack, "", &RenderContext::strict()).unwrap();
/// assert_eq!(index.render_calls().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockLibraryIndex {
    packages: RwLock<Vec<PackageRef>>,
    pages: RwLock<HashMap<(String, String), String>>,
    failing: RwLock<HashSet<String>>,
    calls: Mutex<Vec<RenderCall>>,
}

impl MockLibraryIndex {
    /// Create a new empty mock index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package with the given name.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_package(self, name: impl Into<String>) -> Self {
        self.with_package_ref(PackageRef::new(name))
    }

    /// Add a fully specified package.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_package_ref(self, package: PackageRef) -> Self {
        self.packages.write().unwrap().push(package);
        self
    }

    /// Add a rendered HTML page below a package.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(
        self,
        package: impl Into<String>,
        path: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert((package.into(), path.into()), html.into());
        self
    }

    /// Make every render of `package` fail with an internal error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, package: impl Into<String>) -> Self {
        self.failing.write().unwrap().insert(package.into());
        self
    }

    /// All render calls made so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn render_calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl LibraryIndex for MockLibraryIndex {
    fn list_all(&self) -> Result<LibraryCollection, LibraryError> {
        Ok(LibraryCollection::new(self.packages.read().unwrap().clone()))
    }

    fn package(&self, name: &str) -> Result<Option<PackageRef>, LibraryError> {
        Ok(self
            .packages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.name == name)
            .cloned())
    }

    fn render(
        &self,
        package: &PackageRef,
        path: &str,
        ctx: &RenderContext,
    ) -> Result<Rendered, LibraryError> {
        self.calls.lock().unwrap().push(RenderCall {
            package: package.name.clone(),
            path: path.to_owned(),
            safe_mode: ctx.safe_mode,
        });

        if self.failing.read().unwrap().contains(&package.name) {
            return Err(LibraryError::Invalid(format!(
                "renderer crashed on {}",
                package.name
            )));
        }

        self.pages
            .read()
            .unwrap()
            .get(&(package.name.clone(), path.to_owned()))
            .map(|html| Rendered::html(html.clone()))
            .ok_or_else(|| LibraryError::not_found(&package.name, path))
    }
}
