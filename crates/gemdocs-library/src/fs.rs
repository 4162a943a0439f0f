//! Filesystem library index.
//!
//! Serves pre-rendered documentation trees, one directory per package:
//!
//! ```text
//! {root}/
//! +-- rack/
//! |   +-- meta.toml        # optional: version and owning project
//! |   +-- index.html
//! |   +-- Rack/Request.html
//! +-- rails/
//!     +-- ...
//! ```

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::index::{LibraryError, LibraryIndex, RenderContext, Rendered};
use crate::package::{LibraryCollection, PackageRef};

/// Sidecar metadata filename inside each package directory.
const META_FILENAME: &str = "meta.toml";

/// Page rendered for a package or directory without an explicit file.
const INDEX_FILENAME: &str = "index.html";

/// Package metadata loaded from the sidecar file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PackageMeta {
    version: Option<String>,
    project: Option<String>,
}

/// [`LibraryIndex`] backed by a directory of pre-rendered documentation.
///
/// Pre-rendered trees contain no executable directives, so the render
/// context's sandbox setting has nothing to relax here.
#[derive(Debug)]
pub struct FsLibraryIndex {
    root: PathBuf,
}

impl FsLibraryIndex {
    /// Create an index rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Check that a package name maps to exactly one directory below the root.
    fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && !name.starts_with('.')
            && !name.starts_with('_')
            && !name.contains(['/', '\\', '\0'])
    }

    /// Reject paths that could escape the package directory.
    fn is_valid_path(path: &str) -> bool {
        !path.contains('\0')
            && Path::new(path)
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    }

    /// Build a package reference, reading the sidecar metadata if present.
    fn load_package(&self, name: &str) -> PackageRef {
        let meta_path = self.root.join(name).join(META_FILENAME);
        let meta = match fs::read_to_string(&meta_path) {
            Ok(content) => toml::from_str::<PackageMeta>(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %meta_path.display(), error = %e, "Ignoring invalid package metadata");
                PackageMeta::default()
            }),
            Err(_) => PackageMeta::default(),
        };

        PackageRef {
            name: name.to_owned(),
            version: meta.version,
            project: meta.project,
        }
    }

    /// Map a path below a package to the file that holds its rendered page.
    fn resolve_file(package_dir: &Path, path: &str) -> PathBuf {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return package_dir.join(INDEX_FILENAME);
        }

        let file = package_dir.join(path);
        if file.is_dir() {
            return file.join(INDEX_FILENAME);
        }
        if file.is_file() || file.extension().is_some() {
            return file;
        }
        let mut html = file.into_os_string();
        html.push(".html");
        PathBuf::from(html)
    }
}

impl LibraryIndex for FsLibraryIndex {
    fn list_all(&self) -> Result<LibraryCollection, LibraryError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LibraryCollection::default());
            }
            Err(e) => {
                return Err(LibraryError::Io {
                    path: self.root.clone(),
                    source: e,
                });
            }
        };

        let packages = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| Self::is_valid_name(name))
            .map(|name| self.load_package(&name))
            .collect();

        Ok(LibraryCollection::new(packages))
    }

    fn package(&self, name: &str) -> Result<Option<PackageRef>, LibraryError> {
        if !Self::is_valid_name(name) || !self.root.join(name).is_dir() {
            return Ok(None);
        }
        Ok(Some(self.load_package(name)))
    }

    fn render(
        &self,
        package: &PackageRef,
        path: &str,
        ctx: &RenderContext,
    ) -> Result<Rendered, LibraryError> {
        if !Self::is_valid_name(&package.name) || !Self::is_valid_path(path) {
            return Err(LibraryError::not_found(&package.name, path));
        }

        let file = Self::resolve_file(&self.root.join(&package.name), path);
        tracing::debug!(
            package = %package.name,
            file = %file.display(),
            safe_mode = ctx.safe_mode,
            "Reading pre-rendered page"
        );

        let content =
            fs::read(&file).map_err(|e| LibraryError::io(e, file.clone(), &package.name, path))?;
        let content_type = mime_guess::from_path(&file)
            .first_or_octet_stream()
            .to_string();

        Ok(Rendered {
            content,
            content_type,
        })
    }
}
