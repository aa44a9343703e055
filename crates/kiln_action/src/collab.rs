//! Collaborators the combinators delegate to.
//!
//! Reading page files and applying templates are not the business of this
//! crate; the combinators only need something that does it. `kiln_page`
//! provides the default implementations.

use std::path::{Path, PathBuf};

use kiln_common::Context;

use crate::error::ActionError;

/// Parses a page file into a context.
pub trait PageReader {
    /// Reads and parses the page at `path`.
    fn read_page(&self, path: &Path) -> Result<Context, ActionError>;
}

/// Renders a context against a sequence of templates.
pub trait Renderer {
    /// Applies `templates` to `context`, returning the rendered text.
    fn render(&self, templates: &[PathBuf], context: &Context) -> Result<String, ActionError>;
}
