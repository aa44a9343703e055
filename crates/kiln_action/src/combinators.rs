//! Combinators that build and merge actions.
//!
//! Every combinator is a pure constructor: it computes the dependency list and
//! URL of the new action up front and defers all file access to the producer.
//! Failures surface only when the resulting action is produced.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use kiln_common::{output_url, relative_root, Context, BODY_KEY, PATH_KEY, ROOT_KEY, URL_KEY};

use crate::action::{Action, Producer};
use crate::collab::{PageReader, Renderer};
use crate::error::ActionError;

/// Value side of a custom page association.
pub enum Association {
    /// A string used as-is.
    Literal(String),
    /// A string produced by a nested action.
    Action(Action<String>),
}

impl From<&str> for Association {
    fn from(value: &str) -> Self {
        Association::Literal(value.to_string())
    }
}

impl From<String> for Association {
    fn from(value: String) -> Self {
        Association::Literal(value)
    }
}

impl From<Action<String>> for Association {
    fn from(action: Action<String>) -> Self {
        Association::Action(action)
    }
}

/// Builds the action for a page file.
///
/// The URL is derived from the path relative to `source_root`. The produced
/// context holds the parsed page plus `url`, `path` and `root`; the derived
/// `url` replaces any `url` the page itself declares.
pub fn create_page(
    source_root: &Path,
    path: impl Into<PathBuf>,
    reader: Rc<dyn PageReader>,
) -> Action<Context> {
    let path = path.into();
    let url = output_url(path.strip_prefix(source_root).unwrap_or(&path));
    let producer = PageProducer {
        path: path.clone(),
        url: url.clone(),
        reader,
    };
    Action::new(vec![path], Some(url), producer)
}

/// Builds a page at `url` from literal and computed associations.
///
/// The dependencies are those of every nested action, in association order.
/// The produced context starts with `url` set to `url`; associations are
/// inserted after it in order, so an association named `url` overrides the
/// implicit one. The action's own URL is always `url`.
pub fn create_custom_page(
    url: impl Into<String>,
    associations: Vec<(String, Association)>,
) -> Action<Context> {
    let url = url.into();
    let mut dependencies = Vec::new();
    let mut entries = Vec::with_capacity(associations.len());
    for (key, association) in associations {
        let entry = match association {
            Association::Literal(value) => Entry::Literal(value),
            Association::Action(action) => {
                let (deps, _, producer) = action.into_parts();
                dependencies.extend(deps);
                Entry::Deferred(producer)
            }
        };
        entries.push((key, entry));
    }
    let producer = CustomPageProducer {
        url: url.clone(),
        entries,
    };
    Action::new(dependencies, Some(url), producer)
}

/// Builds a listing page at `url`.
///
/// Each renderable is rendered against `templates` and the results are
/// concatenated, in renderable order, into the `body` of a custom page whose
/// remaining associations are `additional`.
pub fn create_listing(
    url: impl Into<String>,
    templates: Vec<PathBuf>,
    renderables: Vec<Action<Context>>,
    additional: Vec<(String, Association)>,
    renderer: Rc<dyn Renderer>,
) -> Action<Context> {
    let mut dependencies = Vec::new();
    let mut items = Vec::with_capacity(renderables.len());
    for renderable in renderables {
        let (deps, _, producer) = renderable.into_parts();
        dependencies.extend(deps);
        items.push(producer);
    }
    dependencies.extend(templates.iter().cloned());

    let body = Action::new(
        dependencies,
        None,
        ConcatProducer {
            items,
            templates,
            renderer,
        },
    );

    let mut associations = Vec::with_capacity(additional.len() + 1);
    associations.push((BODY_KEY.to_string(), Association::Action(body)));
    associations.extend(additional);
    create_custom_page(url, associations)
}

/// Merges two actions.
///
/// Dependencies are concatenated, the URL is `x`'s if it has one and `y`'s
/// otherwise, and the contexts are united with `x` winning on shared keys.
pub fn combine(x: Action<Context>, y: Action<Context>) -> Action<Context> {
    let (mut dependencies, x_url, first) = x.into_parts();
    let (y_deps, y_url, second) = y.into_parts();
    dependencies.extend(y_deps);
    let url = x_url.or(y_url);
    let producer = CombinedProducer {
        first,
        second,
        url_override: None,
    };
    Action::new(dependencies, url, producer)
}

/// Like [`combine`], but the result renders to `url` and its context's `url`
/// key is forced to `url` whatever `x` and `y` produce.
pub fn combine_with_url(
    url: impl Into<String>,
    x: Action<Context>,
    y: Action<Context>,
) -> Action<Context> {
    let url = url.into();
    let (mut dependencies, _, first) = x.into_parts();
    let (y_deps, _, second) = y.into_parts();
    dependencies.extend(y_deps);
    let producer = CombinedProducer {
        first,
        second,
        url_override: Some(url.clone()),
    };
    Action::new(dependencies, Some(url), producer)
}

struct PageProducer {
    path: PathBuf,
    url: String,
    reader: Rc<dyn PageReader>,
}

impl Producer<Context> for PageProducer {
    fn produce(&self) -> Result<Context, ActionError> {
        let mut context = self.reader.read_page(&self.path)?;
        context.insert(URL_KEY, self.url.as_str());
        context.insert(PATH_KEY, self.path.to_string_lossy());
        context.insert(ROOT_KEY, relative_root(&self.url));
        Ok(context)
    }
}

enum Entry {
    Literal(String),
    Deferred(Box<dyn Producer<String>>),
}

struct CustomPageProducer {
    url: String,
    entries: Vec<(String, Entry)>,
}

impl Producer<Context> for CustomPageProducer {
    fn produce(&self) -> Result<Context, ActionError> {
        let mut context = Context::new().with(URL_KEY, self.url.as_str());
        for (key, entry) in &self.entries {
            let value = match entry {
                Entry::Literal(value) => value.clone(),
                Entry::Deferred(producer) => producer.produce()?,
            };
            context.insert(key.as_str(), value);
        }
        Ok(context)
    }
}

struct ConcatProducer {
    items: Vec<Box<dyn Producer<Context>>>,
    templates: Vec<PathBuf>,
    renderer: Rc<dyn Renderer>,
}

impl Producer<String> for ConcatProducer {
    fn produce(&self) -> Result<String, ActionError> {
        let mut out = String::new();
        for item in &self.items {
            let context = item.produce()?;
            out.push_str(&self.renderer.render(&self.templates, &context)?);
        }
        Ok(out)
    }
}

struct CombinedProducer {
    first: Box<dyn Producer<Context>>,
    second: Box<dyn Producer<Context>>,
    url_override: Option<String>,
}

impl Producer<Context> for CombinedProducer {
    fn produce(&self) -> Result<Context, ActionError> {
        let first = self.first.produce()?;
        let second = self.second.produce()?;
        let mut context = first.union(second);
        if let Some(url) = &self.url_override {
            context.insert(URL_KEY, url.as_str());
        }
        Ok(context)
    }
}
