//! Modification-time based freshness checks.
//!
//! A target file is fresh when it exists and its modification time is
//! strictly newer than that of every dependency. Equal timestamps count as
//! stale: on filesystems with coarse timestamp resolution a dependency written
//! in the same tick as the target may well be newer.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::CacheError;

/// Outcome of comparing a target against its dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// The target is newer than every dependency.
    Fresh,

    /// The target itself does not exist.
    TargetMissing,

    /// A declared dependency does not exist.
    DependencyMissing(PathBuf),

    /// A dependency was modified at or after the target.
    Outdated(PathBuf),
}

impl Staleness {
    /// Returns `true` only for [`Staleness::Fresh`].
    pub fn is_fresh(&self) -> bool {
        matches!(self, Staleness::Fresh)
    }
}

/// Compares `target` against every path in `dependencies`.
///
/// Missing files are reported through the returned [`Staleness`]; only
/// unexpected metadata failures (permissions, unsupported timestamps) are
/// returned as errors.
pub fn check(target: &Path, dependencies: &[PathBuf]) -> Result<Staleness, CacheError> {
    let Some(target_time) = modified(target)? else {
        return Ok(Staleness::TargetMissing);
    };

    for dep in dependencies {
        match modified(dep)? {
            None => return Ok(Staleness::DependencyMissing(dep.clone())),
            Some(dep_time) if dep_time >= target_time => {
                return Ok(Staleness::Outdated(dep.clone()));
            }
            Some(_) => {}
        }
    }

    Ok(Staleness::Fresh)
}

/// Returns the modification time of `path`, or `None` if it does not exist.
fn modified(path: &Path) -> Result<Option<SystemTime>, CacheError> {
    let io_err = |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };
    match std::fs::metadata(path) {
        Ok(meta) => meta.modified().map(Some).map_err(io_err),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(e)),
    }
}
