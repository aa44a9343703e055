//! Mapping of logical paths to cache files, output URLs and destinations.
//!
//! A logical path is a relative, `/`-separated name such as `posts/intro.md`
//! or `posts/intro.html`. The layout resolves it against the configured
//! cache and output roots. Root and `.` components are dropped and `..`
//! removes the preceding name, stopping at the root, so a logical path can
//! never escape either root.

use std::path::{Component, Path, PathBuf};

/// Extension given to every rendered output file.
const OUTPUT_EXT: &str = "html";

/// Filesystem roots for one site build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    /// Directory holding cached build results.
    pub cache_dir: PathBuf,

    /// Directory receiving rendered output files.
    pub output_dir: PathBuf,
}

impl SiteLayout {
    /// Creates a layout with the given cache and output roots.
    pub fn new(cache_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Returns the file an output URL is written to.
    pub fn destination(&self, url: &str) -> PathBuf {
        self.output_dir.join(normalize(Path::new(url)))
    }
}

/// Returns the cache file holding the result for a logical path.
pub fn cache_location(cache_dir: &Path, logical: &Path) -> PathBuf {
    cache_dir.join(normalize(logical))
}

/// Reduces `path` to plain names relative to an implicit root.
///
/// `..` cancels the preceding name; a `..` with nothing left to cancel is
/// dropped, so `a/../b` is `b` and `../../etc` is `etc`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                parts.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    parts.into_iter().collect()
}

/// Canonical `/`-separated form of an output URL.
///
/// Two URLs name the same output file exactly when their canonical forms are
/// equal.
pub fn canonical_url(url: &str) -> String {
    normalize(Path::new(url))
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("/")
}

/// Derives the output URL for a source file given relative to the source root.
///
/// The extension is replaced with `html` and components are joined with `/`
/// regardless of platform.
pub fn output_url(source_rel: &Path) -> String {
    let mut path = normalize(source_rel);
    path.set_extension(OUTPUT_EXT);
    path.components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("/")
}

/// Returns the relative path from the page at `url` back to the site root.
///
/// Top-level pages get `"."`; nested pages get one `".."` per directory level.
pub fn relative_root(url: &str) -> String {
    let depth = url
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .count()
        .saturating_sub(1);
    if depth == 0 {
        ".".to_string()
    } else {
        vec![".."; depth].join("/")
    }
}
