//! Page file parsing.
//!
//! A page file optionally starts with a metadata block:
//!
//! ```text
//! ---
//! title: Hello
//! author: Someone
//! ---
//! Body text.
//! ```
//!
//! Each metadata line becomes a context key; the rest of the file becomes the
//! `body`. Markdown pages (`.md`, `.markdown`) have their body converted to
//! HTML.

use std::path::Path;

use comrak::{format_html, parse_document, Arena, Options};
use kiln_action::{ActionError, PageReader};
use kiln_common::{Context, BODY_KEY};
use tracing::debug;

/// Line that opens and closes the metadata block.
const DELIMITER: &str = "---";

/// File extensions whose body is Markdown.
const MARKDOWN_EXTS: &[&str] = &["md", "markdown"];

/// Reads page files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageParser;

impl PageReader for PageParser {
    fn read_page(&self, path: &Path) -> Result<Context, ActionError> {
        let text = std::fs::read_to_string(path).map_err(|e| ActionError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let markdown = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| MARKDOWN_EXTS.contains(&ext));
        debug!(path = %path.display(), markdown, "parsing page");
        parse_page(&text, markdown).map_err(|reason| ActionError::Parse {
            path: path.to_path_buf(),
            reason,
        })
    }
}

/// Parses page text into a context.
///
/// Returns a description of the problem if the metadata block is unterminated
/// or contains a line that is not `key: value`.
pub fn parse_page(text: &str, markdown: bool) -> Result<Context, String> {
    let mut context = Context::new();
    let mut lines = text.split_inclusive('\n');
    let mut body_start = 0;

    if let Some(first) = lines.next().filter(|line| line.trim_end() == DELIMITER) {
        body_start = first.len();
        let mut closed = false;
        for (index, line) in lines.enumerate() {
            body_start += line.len();
            let trimmed = line.trim();
            if trimmed == DELIMITER {
                closed = true;
                break;
            }
            if trimmed.is_empty() {
                continue;
            }
            let (key, value) = trimmed
                .split_once(':')
                .ok_or_else(|| format!("metadata line {} has no ':'", index + 2))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("metadata line {} has an empty key", index + 2));
            }
            context.insert(key, value.trim());
        }
        if !closed {
            return Err("metadata block is not closed with '---'".to_string());
        }
    }

    let body = &text[body_start..];
    let body = if markdown {
        markdown_to_html(body)?
    } else {
        body.to_string()
    };
    context.insert(BODY_KEY, body);
    Ok(context)
}

fn markdown_options() -> Options<'static> {
    let mut options = Options::default();
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.footnotes = true;
    options
}

fn markdown_to_html(body: &str) -> Result<String, String> {
    let options = markdown_options();
    let arena = Arena::new();
    let root = parse_document(&arena, body, &options);
    let mut html = String::new();
    format_html(root, &options, &mut html)
        .map_err(|e| format!("markdown rendering failed: {e}"))?;
    Ok(html)
}
