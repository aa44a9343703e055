//! The `Action` type and the `Producer` capability it wraps.

use std::fmt;
use std::path::PathBuf;

use crate::error::ActionError;

/// A deferred computation yielding a `T`.
///
/// Producers may read files, but must not touch the build cache. Any closure
/// `Fn() -> Result<T, ActionError>` is a producer.
pub trait Producer<T> {
    /// Runs the computation.
    fn produce(&self) -> Result<T, ActionError>;
}

impl<T, F> Producer<T> for F
where
    F: Fn() -> Result<T, ActionError>,
{
    fn produce(&self) -> Result<T, ActionError> {
        self()
    }
}

/// A dependency-annotated deferred computation.
///
/// `dependencies` must list every file the producer reads: a file read but
/// not declared will not invalidate cached results when it changes. Nothing
/// checks this; it is the responsibility of whoever builds the action.
pub struct Action<T> {
    dependencies: Vec<PathBuf>,
    url: Option<String>,
    producer: Box<dyn Producer<T>>,
}

impl<T> Action<T> {
    /// Creates an action from its parts.
    pub fn new(
        dependencies: Vec<PathBuf>,
        url: Option<String>,
        producer: impl Producer<T> + 'static,
    ) -> Self {
        Self {
            dependencies,
            url,
            producer: Box::new(producer),
        }
    }

    /// Files whose modification invalidates this action's result.
    pub fn dependencies(&self) -> &[PathBuf] {
        &self.dependencies
    }

    /// URL the result is rendered to, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Runs the producer.
    pub fn produce(&self) -> Result<T, ActionError> {
        self.producer.produce()
    }

    pub(crate) fn into_parts(self) -> (Vec<PathBuf>, Option<String>, Box<dyn Producer<T>>) {
        (self.dependencies, self.url, self.producer)
    }
}

impl<T: Clone + 'static> Action<T> {
    /// An action with no dependencies and no URL that always yields `value`.
    pub fn constant(value: T) -> Self {
        Self::new(Vec::new(), None, move || Ok(value.clone()))
    }
}

impl<T> fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("dependencies", &self.dependencies)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
