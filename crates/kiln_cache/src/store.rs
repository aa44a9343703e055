//! High-level cache store.
//!
//! The `CacheStore` persists serializable values under a cache root, one entry
//! per logical path, and answers whether an entry is still fresh with respect
//! to the files it was derived from. The cache root is always passed in
//! explicitly; there is no process-wide default.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::entry;
use crate::error::CacheError;
use crate::freshness::{self, Staleness};

/// Suffix of the temporary file an entry is written to before being renamed.
const TMP_SUFFIX: &str = "tmp";

/// Cache of build results keyed by logical path.
///
/// A single writer process per cache root is assumed. Entries are replaced
/// atomically, so a reader never observes a half-written entry, but two
/// concurrent builds writing the same entry race.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Root directory for all cache entries.
    cache_dir: PathBuf,

    /// Kiln version string recorded in, and required of, every entry.
    kiln_version: String,
}

impl CacheStore {
    /// Creates a store rooted at `cache_dir`. Nothing is created on disk
    /// until the first [`store`](Self::store).
    pub fn new(cache_dir: impl Into<PathBuf>, kiln_version: &str) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            kiln_version: kiln_version.to_string(),
        }
    }

    /// Returns the cache root.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the file holding the entry for `logical`.
    pub fn entry_path(&self, logical: &Path) -> PathBuf {
        kiln_common::cache_location(&self.cache_dir, logical)
    }

    /// Serializes `value` as the entry for `logical`, creating parent
    /// directories as needed.
    pub fn store<T: Serialize + ?Sized>(&self, value: &T, logical: &Path) -> Result<(), CacheError> {
        let path = self.entry_path(logical);
        let bytes = entry::encode(value, &self.kiln_version)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let tmp = tmp_path(&path);
        std::fs::write(&tmp, &bytes).map_err(|e| CacheError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(CacheError::Io { path, source: e });
        }

        debug!(path = %path.display(), bytes = bytes.len(), "stored cache entry");
        Ok(())
    }

    /// Reads back the entry for `logical`.
    ///
    /// Fails with [`CacheError::NotFound`] if there is no entry and with
    /// [`CacheError::Decode`] or [`CacheError::InvalidHeader`] if the entry
    /// was written by an incompatible build.
    pub fn load<T: DeserializeOwned>(&self, logical: &Path) -> Result<T, CacheError> {
        let path = self.entry_path(logical);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CacheError::NotFound { path });
            }
            Err(e) => return Err(CacheError::Io { path, source: e }),
        };
        entry::decode(&path, &raw, &self.kiln_version)
    }

    /// Returns `true` if the entry for `logical` exists, every dependency
    /// exists, and the entry is strictly newer than every dependency.
    pub fn is_fresh(&self, logical: &Path, dependencies: &[PathBuf]) -> Result<bool, CacheError> {
        let path = self.entry_path(logical);
        let staleness = freshness::check(&path, dependencies)?;
        match &staleness {
            Staleness::Fresh => debug!(path = %path.display(), "cache entry is fresh"),
            Staleness::TargetMissing => debug!(path = %path.display(), "no cache entry"),
            Staleness::DependencyMissing(dep) => debug!(
                path = %path.display(),
                dependency = %dep.display(),
                "dependency missing"
            ),
            Staleness::Outdated(dep) => debug!(
                path = %path.display(),
                dependency = %dep.display(),
                "dependency changed since entry was written"
            ),
        }
        Ok(staleness.is_fresh())
    }

    /// Deletes the entry for `logical`. Returns `false` if there was none.
    pub fn remove(&self, logical: &Path) -> Result<bool, CacheError> {
        let path = self.entry_path(logical);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io { path, source: e }),
        }
    }

    /// Deletes the whole cache root.
    pub fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_dir_all(&self.cache_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io {
                path: self.cache_dir.clone(),
                source: e,
            }),
        }
    }
}

/// Returns the sibling file an entry is staged in.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(TMP_SUFFIX);
    path.with_file_name(name)
}
