//! Project discovery shared by every command.
//!
//! Finds the project root, loads `kiln.toml`, resolves configured paths
//! against the root and discovers page files.

use std::path::{Path, PathBuf};

use kiln_cache::CacheStore;
use kiln_common::SiteLayout;
use kiln_config::{load_config, ConfigError, SiteConfig, CONFIG_FILE};

use crate::GlobalArgs;

/// Version recorded in every cache entry.
pub const KILN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A loaded site project.
#[derive(Debug)]
pub struct Project {
    /// Directory containing `kiln.toml`.
    pub root: PathBuf,
    /// The parsed configuration.
    pub config: SiteConfig,
}

impl Project {
    /// Loads the project selected by the global CLI flags.
    pub fn load(global: &GlobalArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let root = resolve_project_root(global)?;
        Ok(Self::open(&root)?)
    }

    /// Loads the project rooted at `root`.
    pub fn open(root: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            root: root.to_path_buf(),
            config: load_config(root)?,
        })
    }

    /// Path of the configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Directory holding page files.
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.config.site.source)
    }

    /// Cache and output roots of the project.
    pub fn layout(&self) -> SiteLayout {
        SiteLayout::new(
            self.root.join(&self.config.site.cache_dir),
            self.root.join(&self.config.site.output_dir),
        )
    }

    /// The project's build cache.
    pub fn cache_store(&self) -> CacheStore {
        CacheStore::new(self.root.join(&self.config.site.cache_dir), KILN_VERSION)
    }

    /// Resolves configured paths against the project root.
    pub fn resolve_all(&self, paths: &[String]) -> Vec<PathBuf> {
        paths.iter().map(|p| self.root.join(p)).collect()
    }
}

/// Walks up from `start` looking for the nearest directory containing `kiln.toml`.
///
/// Returns the directory containing `kiln.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `kiln.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(|parent| parent.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Page files and directories found under a source directory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceTree {
    /// Page files, sorted by path.
    pub pages: Vec<PathBuf>,
    /// The source directory and every directory below it, sorted by path.
    pub dirs: Vec<PathBuf>,
}

/// Discovers page files and directories under `dir` (recursive).
///
/// Hidden entries and the directories in `exclude` are skipped.
pub fn discover_tree(
    dir: &Path,
    exclude: &[PathBuf],
) -> Result<SourceTree, Box<dyn std::error::Error>> {
    let mut tree = SourceTree::default();
    walk_dir(dir, exclude, &mut tree)?;
    tree.pages.sort();
    tree.dirs.sort();
    Ok(tree)
}

/// Recursively walks a directory collecting page files and directories.
fn walk_dir(
    dir: &Path,
    exclude: &[PathBuf],
    tree: &mut SourceTree,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("cannot read page directory {}: {e}", dir.display()))?;
    tree.dirs.push(dir.to_path_buf());
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if is_hidden(&path) || exclude.contains(&path) {
            continue;
        }
        if path.is_dir() {
            walk_dir(&path, exclude, tree)?;
        } else {
            tree.pages.push(path);
        }
    }
    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
