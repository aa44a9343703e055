//! `kiln build`: incremental site build.
//!
//! 1. Find the project root and load `kiln.toml`
//! 2. Discover page files and directories under the source directory
//! 3. Turn every page and every listing into an action
//! 4. Skip outputs that are newer than everything they are derived from
//! 5. Run the remaining actions through the cache, render and write them
//! 6. Remove outputs whose sources disappeared since the previous build

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use kiln_action::{
    combine, combine_with_url, create_listing, create_page, run_cached, Action, ActionError,
    Association, Outcome, PageReader, Renderer,
};
use kiln_cache::{freshness, CacheStore};
use kiln_common::{canonical_url, relative_root, Context, SiteLayout, ROOT_KEY};
use kiln_config::{ListingConfig, SortOrder};
use kiln_page::{PageParser, TemplateRenderer};
use tracing::{debug, info};

use crate::manifest::{BuildManifest, MANIFEST_ENTRY};
use crate::project::{discover_tree, Project, SourceTree};
use crate::{BuildArgs, GlobalArgs};

/// Context key holding the site name.
pub const SITE_KEY: &str = "site";

/// Options for a single build.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildOptions {
    /// Clear the cache and rewrite every output.
    pub force: bool,
}

/// What happened to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// The output was newer than all of its inputs and was left alone.
    Skipped,
    /// The output was rewritten from a fresh cache entry.
    Cached,
    /// The output was rewritten from a newly produced context.
    Built,
}

/// Counts of outputs per [`PageStatus`], plus removed outputs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    /// Outputs produced from scratch.
    pub built: usize,
    /// Outputs rendered from the cache.
    pub cached: usize,
    /// Outputs left untouched.
    pub skipped: usize,
    /// Outputs of the previous build whose source is gone.
    pub removed: usize,
}

impl BuildSummary {
    fn record(&mut self, status: PageStatus) {
        match status {
            PageStatus::Skipped => self.skipped += 1,
            PageStatus::Cached => self.cached += 1,
            PageStatus::Built => self.built += 1,
        }
    }
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "built {}, cached {}, skipped {}",
            self.built, self.cached, self.skipped
        )?;
        if self.removed > 0 {
            write!(f, ", removed {}", self.removed)?;
        }
        Ok(())
    }
}

/// Runs the `kiln build` command.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;

    if !global.quiet {
        eprintln!("   Building {}", project.config.site.name);
    }

    let summary = build_site(&project, BuildOptions { force: args.force })?;

    if !global.quiet {
        eprintln!("{summary}");
    }
    Ok(0)
}

/// Builds every page and listing of `project`.
///
/// Fails before writing anything if two pages or listings render to the same
/// output file.
pub fn build_site(
    project: &Project,
    options: BuildOptions,
) -> Result<BuildSummary, Box<dyn std::error::Error>> {
    let store = project.cache_store();
    let previous = BuildManifest::load(&store)?;
    if options.force {
        info!(cache = %store.cache_dir().display(), "clearing cache");
        store.clear()?;
    }

    let layout = project.layout();
    let source_dir = project.source_dir();
    let tree = discover_tree(
        &source_dir,
        &[layout.cache_dir.clone(), layout.output_dir.clone()],
    )?;
    debug!(
        pages = tree.pages.len(),
        dirs = tree.dirs.len(),
        dir = %source_dir.display(),
        "discovered sources"
    );

    let reader: Rc<dyn PageReader> = Rc::new(PageParser);
    let renderer: Rc<dyn Renderer> = Rc::new(TemplateRenderer::new());
    let site = SiteFields {
        config: project.config_path(),
        name: project.config.site.name.clone(),
    };

    let page_actions: Vec<Action<Context>> = tree
        .pages
        .iter()
        .map(|path| {
            combine(
                create_page(&source_dir, path.clone(), Rc::clone(&reader)),
                site.action(),
            )
        })
        .collect();

    let mut owners = HashMap::from([(
        MANIFEST_ENTRY.to_string(),
        "the build manifest".to_string(),
    )]);
    for (action, path) in page_actions.iter().zip(&tree.pages) {
        let url = action.url().unwrap_or_default();
        claim_url(&mut owners, url, format!("page {}", path.display()))?;
    }
    for listing in &project.config.listings {
        claim_url(
            &mut owners,
            &listing.url,
            format!("listing '{}'", listing.url),
        )?;
    }

    let writer = OutputWriter {
        layout: &layout,
        store: &store,
        renderer: renderer.as_ref(),
        force: options.force,
    };
    let mut summary = BuildSummary::default();
    let mut current = BuildManifest::default();

    let site_templates = project.resolve_all(&project.config.site.templates);
    for action in &page_actions {
        summary.record(writer.write(action, &site_templates)?);
        let url = action.url().unwrap_or_default();
        current.outputs.insert(canonical_url(url));
    }

    for listing in &project.config.listings {
        let action = listing_action(
            project,
            listing,
            &source_dir,
            &tree,
            &reader,
            &renderer,
            &site,
        );
        let templates = project.resolve_all(&listing.templates);
        summary.record(writer.write(&action, &templates)?);
        current.outputs.insert(canonical_url(&listing.url));
    }

    for url in previous.orphans(&current) {
        writer.remove(url)?;
        summary.removed += 1;
    }
    current.save(&store)?;

    info!(
        built = summary.built,
        cached = summary.cached,
        skipped = summary.skipped,
        removed = summary.removed,
        "build finished"
    );
    Ok(summary)
}

/// Records `owner` as the producer of `url`, failing if another page or
/// listing already renders to the same file.
fn claim_url(
    owners: &mut HashMap<String, String>,
    url: &str,
    owner: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let canonical = canonical_url(url);
    if canonical.is_empty() {
        return Err(format!("{owner} does not name an output file").into());
    }
    match owners.entry(canonical) {
        Entry::Occupied(existing) => Err(format!(
            "{} and {owner} both render to '{}'",
            existing.get(),
            existing.key()
        )
        .into()),
        Entry::Vacant(slot) => {
            slot.insert(owner);
            Ok(())
        }
    }
}

/// Site-wide fields merged into every page.
struct SiteFields {
    config: PathBuf,
    name: String,
}

impl SiteFields {
    /// An action yielding `{site: <name>}` that depends on `kiln.toml`.
    fn action(&self) -> Action<Context> {
        let name = self.name.clone();
        Action::new(
            vec![self.config.clone()],
            None,
            move || -> Result<Context, ActionError> {
                Ok(Context::new().with(SITE_KEY, name.as_str()))
            },
        )
    }
}

/// An action contributing no fields that depends on `dirs`.
///
/// A directory's modification time moves whenever an entry is added to or
/// removed from it, whatever the entry's own timestamps.
fn directories(dirs: Vec<PathBuf>) -> Action<Context> {
    Action::new(dirs, None, || -> Result<Context, ActionError> {
        Ok(Context::new())
    })
}

/// Builds the action for one configured listing.
///
/// The listed pages are the discovered pages under the listing's `pages`
/// directory, ordered by source path. The action also depends on that
/// directory and every directory below it, so adding or removing a page
/// invalidates the listing.
fn listing_action(
    project: &Project,
    listing: &ListingConfig,
    source_dir: &Path,
    tree: &SourceTree,
    reader: &Rc<dyn PageReader>,
    renderer: &Rc<dyn Renderer>,
    site: &SiteFields,
) -> Action<Context> {
    let url = canonical_url(&listing.url);
    let listed_dir = source_dir.join(&listing.pages);
    let mut listed: Vec<&PathBuf> = tree
        .pages
        .iter()
        .filter(|path| path.starts_with(&listed_dir))
        .collect();
    if listing.order == SortOrder::Descending {
        listed.reverse();
    }

    let mut watched: Vec<PathBuf> = tree
        .dirs
        .iter()
        .filter(|dir| dir.starts_with(&listed_dir))
        .cloned()
        .collect();
    if watched.is_empty() {
        // The listed directory does not exist yet; creating it touches the
        // source directory.
        watched.push(source_dir.to_path_buf());
    }

    let items = listed
        .into_iter()
        .map(|path| {
            combine(
                create_page(source_dir, path.clone(), Rc::clone(reader)),
                site.action(),
            )
        })
        .collect();

    let mut additional = vec![(
        ROOT_KEY.to_string(),
        Association::from(relative_root(&url)),
    )];
    additional.extend(
        listing
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), Association::from(value.as_str()))),
    );

    let page = create_listing(
        url.as_str(),
        project.resolve_all(&listing.item_templates),
        items,
        additional,
        Rc::clone(renderer),
    );
    combine_with_url(
        url.as_str(),
        page,
        combine(site.action(), directories(watched)),
    )
}

/// Renders actions to their output files.
struct OutputWriter<'a> {
    layout: &'a SiteLayout,
    store: &'a CacheStore,
    renderer: &'a dyn Renderer,
    force: bool,
}

impl OutputWriter<'_> {
    /// Writes the output of `action` rendered through `templates`, unless the
    /// output is already newer than the action's dependencies and templates.
    fn write(
        &self,
        action: &Action<Context>,
        templates: &[PathBuf],
    ) -> Result<PageStatus, Box<dyn std::error::Error>> {
        let Some(url) = action.url() else {
            return Err("page action has no output url".into());
        };
        let destination = self.layout.destination(url);

        let mut dependencies = action.dependencies().to_vec();
        dependencies.extend(templates.iter().cloned());
        if !self.force && freshness::check(&destination, &dependencies)?.is_fresh() {
            debug!(url, "output is up to date");
            return Ok(PageStatus::Skipped);
        }

        let (context, outcome) = run_cached(action, self.store)?;
        let html = self.renderer.render(templates, &context)?;
        write_file(&destination, &html)?;
        info!(url, destination = %destination.display(), ?outcome, "wrote page");

        Ok(match outcome {
            Outcome::Cached => PageStatus::Cached,
            Outcome::Built => PageStatus::Built,
        })
    }

    /// Deletes the output and cache entry of `url`.
    fn remove(&self, url: &str) -> Result<(), Box<dyn std::error::Error>> {
        let destination = self.layout.destination(url);
        match std::fs::remove_file(&destination) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(format!("cannot remove {}: {e}", destination.display()).into())
            }
        }
        self.store.remove(Path::new(url))?;
        info!(url, destination = %destination.display(), "removed output of deleted source");
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create directory {}: {e}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    Ok(())
}
