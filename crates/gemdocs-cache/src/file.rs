//! File-based page cache.
//!
//! [`FilePageCache`] stores one artifact per normalized request path under a
//! public directory, with a fixed `.html` extension appended:
//!
//! ```text
//! {root}/
//! +-- index.html           # "/"
//! +-- gems.html            # "/gems"
//! +-- gems/
//!     +-- ~r/2.html        # "/gems/~r/2"
//!     +-- rails.html       # "/gems/rails"
//! ```
//!
//! Writes go to a temporary file in the target directory which is then
//! renamed over the artifact, so readers see either the previous complete
//! content or the new complete content. Concurrent writers for one key are
//! last-writer-wins.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::{CacheEntry, PageCache, cache_key};

/// Extension appended to every artifact.
const EXTENSION: &str = "html";

/// File-based [`PageCache`] rooted at a public directory.
#[derive(Debug)]
pub struct FilePageCache {
    root: PathBuf,
}

impl FilePageCache {
    /// Create a cache rooted at `root`.
    ///
    /// The directory is created lazily on first store.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory of the cache.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Artifact file for a normalized key.
    fn artifact_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{EXTENSION}"))
    }

    /// Read an artifact and its modification time through one handle.
    ///
    /// A concurrent store renames a new file over the path but never touches
    /// the file this handle refers to, so content and time always match.
    fn read_artifact(file: &mut fs::File) -> std::io::Result<(Vec<u8>, SystemTime)> {
        let written_at = file.metadata()?.modified()?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok((content, written_at))
    }

    /// Write `content` to `path` atomically.
    fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
        let parent = path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(content)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl PageCache for FilePageCache {
    fn is_enabled(&self) -> bool {
        true
    }

    fn lookup(&self, path: &str) -> Option<CacheEntry> {
        let key = cache_key(path)?;
        let file = self.artifact_path(&key);

        let read = fs::File::open(&file).and_then(|mut handle| Self::read_artifact(&mut handle));
        let (content, written_at) = match read {
            Ok(artifact) => artifact,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "Failed to read cache file");
                return None;
            }
        };
        if content.is_empty() {
            return None;
        }

        tracing::debug!(key = %key, "Page cache hit");

        Some(CacheEntry {
            path: key,
            content,
            written_at,
        })
    }

    fn store(&self, path: &str, content: Vec<u8>) -> Vec<u8> {
        if content.is_empty() {
            return content;
        }
        let Some(key) = cache_key(path) else {
            return content;
        };

        let file = self.artifact_path(&key);
        if let Err(e) = Self::write_atomic(&file, &content) {
            tracing::warn!(path = %file.display(), error = %e, "Failed to write cache file");
        }
        content
    }
}
