//! `kiln clean`: removes the cache and the rendered output.

use std::io::ErrorKind;
use std::path::Path;

use tracing::info;

use crate::project::Project;
use crate::GlobalArgs;

/// Runs the `kiln clean` command.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;
    clean_site(&project)?;
    if !global.quiet {
        eprintln!("     Cleaned {}", project.config.site.name);
    }
    Ok(0)
}

/// Deletes the cache root and the output root of `project`.
///
/// Roots that do not exist are ignored.
pub fn clean_site(project: &Project) -> Result<(), Box<dyn std::error::Error>> {
    let store = project.cache_store();
    store.clear()?;
    info!(dir = %store.cache_dir().display(), "removed cache");

    let output_dir = project.layout().output_dir;
    remove_dir(&output_dir)?;
    info!(dir = %output_dir.display(), "removed output");
    Ok(())
}

fn remove_dir(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("cannot remove {}: {e}", dir.display()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{build_site, BuildOptions};

    #[test]
    fn clean_removes_cache_and_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kiln.toml"), "[site]\nname = \"demo\"\n").unwrap();
        std::fs::create_dir_all(dir.path().join("pages")).unwrap();
        std::fs::write(dir.path().join("pages/a.txt"), "a").unwrap();
        let project = Project::open(dir.path()).unwrap();

        build_site(&project, BuildOptions::default()).unwrap();
        assert!(dir.path().join("_cache").exists());
        assert!(dir.path().join("_site/a.html").exists());

        clean_site(&project).unwrap();
        assert!(!dir.path().join("_cache").exists());
        assert!(!dir.path().join("_site").exists());
        assert!(dir.path().join("pages/a.txt").exists());
    }

    #[test]
    fn clean_without_build_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kiln.toml"), "[site]\nname = \"demo\"\n").unwrap();
        let project = Project::open(dir.path()).unwrap();
        clean_site(&project).unwrap();
    }
}
