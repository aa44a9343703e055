//! Page files and templates.
//!
//! Provides the default [`PageReader`](kiln_action::PageReader) and
//! [`Renderer`](kiln_action::Renderer) used by the `kiln` binary: a parser
//! for page files with a `---` delimited metadata block, and a renderer for
//! templates with `$key$` placeholders.

#![warn(missing_docs)]

pub mod page;
pub mod template;

pub use page::{parse_page, PageParser};
pub use template::{apply_template, TemplateRenderer};
