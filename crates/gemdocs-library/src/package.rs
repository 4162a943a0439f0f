//! Package references and ordered package collections.

use std::cmp::Ordering;

/// A package known to the library index.
///
/// Immutable once resolved for a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageRef {
    /// Package name, unique within the index.
    pub name: String,
    /// Version or commit marker.
    pub version: Option<String>,
    /// Owning project (a coarser grouping than a single package).
    pub project: Option<String>,
}

impl PackageRef {
    /// Create a reference with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            project: None,
        }
    }

    /// Attach a version marker.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Attach the owning project.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Lowercased first character of the name, used for alphabetic buckets.
    #[must_use]
    pub fn bucket(&self) -> Option<char> {
        self.name.chars().next().map(|c| c.to_ascii_lowercase())
    }
}

/// Case-insensitive name ordering, ties broken by the exact name.
fn by_name(a: &PackageRef, b: &PackageRef) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// An ordered sequence of packages.
///
/// Collections built with [`LibraryCollection::new`] are ordered
/// case-insensitively by name. Views derived with
/// [`LibraryCollection::matching`] are ordered by search relevance instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LibraryCollection {
    packages: Vec<PackageRef>,
}

impl LibraryCollection {
    /// Create a name-ordered collection.
    #[must_use]
    pub fn new(mut packages: Vec<PackageRef>) -> Self {
        packages.sort_by(by_name);
        Self { packages }
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// True if the collection has no packages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Iterate over packages in collection order.
    pub fn iter(&self) -> std::slice::Iter<'_, PackageRef> {
        self.packages.iter()
    }

    /// Packages as a slice, in collection order.
    #[must_use]
    pub fn as_slice(&self) -> &[PackageRef] {
        &self.packages
    }

    /// Find a package by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PackageRef> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Packages whose name starts with `letter` (case-insensitive).
    #[must_use]
    pub fn of_letter(&self, letter: char) -> Self {
        let letter = letter.to_ascii_lowercase();
        Self {
            packages: self
                .packages
                .iter()
                .filter(|p| p.bucket() == Some(letter))
                .cloned()
                .collect(),
        }
    }

    /// Packages whose name contains `query` (case-insensitive), by relevance.
    ///
    /// Exact matches come first, then prefix matches, then other matches.
    /// Within each group the collection order is kept, so repeated identical
    /// queries always produce the same order. An empty query matches every
    /// package.
    #[must_use]
    pub fn matching(&self, query: &str) -> Self {
        let query = query.trim().to_lowercase();
        let mut ranked: Vec<(u8, &PackageRef)> = self
            .packages
            .iter()
            .filter_map(|p| {
                let name = p.name.to_lowercase();
                if name == query {
                    Some((0, p))
                } else if name.starts_with(&query) {
                    Some((1, p))
                } else if name.contains(&query) {
                    Some((2, p))
                } else {
                    None
                }
            })
            .collect();
        // Stable sort keeps collection order within a rank.
        ranked.sort_by_key(|(rank, _)| *rank);

        Self {
            packages: ranked.into_iter().map(|(_, p)| p.clone()).collect(),
        }
    }
}

impl From<Vec<PackageRef>> for LibraryCollection {
    fn from(packages: Vec<PackageRef>) -> Self {
        Self::new(packages)
    }
}

impl IntoIterator for LibraryCollection {
    type Item = PackageRef;
    type IntoIter = std::vec::IntoIter<PackageRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.into_iter()
    }
}

impl<'a> IntoIterator for &'a LibraryCollection {
    type Item = &'a PackageRef;
    type IntoIter = std::slice::Iter<'a, PackageRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.iter()
    }
}
