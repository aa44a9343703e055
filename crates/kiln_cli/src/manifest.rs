//! Record of the outputs produced by the previous build.
//!
//! The manifest lives in the cache next to the page entries. Comparing it with
//! the outputs of the current build tells which outputs belong to sources that
//! no longer exist.

use std::collections::BTreeSet;
use std::path::Path;

use kiln_cache::{CacheError, CacheStore};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Logical cache path of the manifest.
///
/// Hidden names are never discovered as pages; a listing claiming this URL is
/// rejected as a collision.
pub const MANIFEST_ENTRY: &str = ".manifest";

/// Canonical URLs of every output written by one build.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Output URLs in canonical form.
    pub outputs: BTreeSet<String>,
}

impl BuildManifest {
    /// Loads the manifest of the previous build.
    ///
    /// A missing or unreadable manifest yields an empty one.
    pub fn load(store: &CacheStore) -> Result<Self, CacheError> {
        match store.load(Path::new(MANIFEST_ENTRY)) {
            Ok(manifest) => Ok(manifest),
            Err(CacheError::NotFound { .. }) => Ok(Self::default()),
            Err(e) if e.is_rebuild_worthy() => {
                warn!(error = %e, "discarding unreadable build manifest");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Writes the manifest to the cache.
    pub fn save(&self, store: &CacheStore) -> Result<(), CacheError> {
        store.store(self, Path::new(MANIFEST_ENTRY))
    }

    /// Outputs recorded in `self` that `current` no longer produces.
    pub fn orphans<'a>(&'a self, current: &'a BuildManifest) -> impl Iterator<Item = &'a str> {
        self.outputs.difference(&current.outputs).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(urls: &[&str]) -> BuildManifest {
        BuildManifest {
            outputs: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    #[test]
    fn missing_manifest_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), "0.1.0");
        assert_eq!(BuildManifest::load(&store).unwrap(), BuildManifest::default());
    }

    #[test]
    fn saved_manifest_is_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), "0.1.0");
        let saved = manifest(&["index.html", "posts/a.html"]);
        saved.save(&store).unwrap();
        assert_eq!(BuildManifest::load(&store).unwrap(), saved);
    }

    #[test]
    fn corrupt_manifest_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), "0.1.0");
        std::fs::write(store.entry_path(Path::new(MANIFEST_ENTRY)), b"junk").unwrap();
        assert_eq!(BuildManifest::load(&store).unwrap(), BuildManifest::default());
    }

    #[test]
    fn orphans_are_previous_outputs_not_produced_now() {
        let previous = manifest(&["a.html", "b.html", "index.html"]);
        let current = manifest(&["a.html", "c.html", "index.html"]);
        assert_eq!(previous.orphans(&current).collect::<Vec<_>>(), vec!["b.html"]);
    }
}
