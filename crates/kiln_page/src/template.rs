//! `$key$` templates.
//!
//! A template is plain text in which `$key$` is replaced by the context's
//! value for `key` and `$$` by a single `$`. A placeholder whose key the
//! context does not define is left as written.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use kiln_action::{ActionError, Renderer};
use kiln_common::{Context, BODY_KEY};

/// Renders contexts against template files, chaining multiple templates.
///
/// The first template is applied to the context; every later template is
/// applied to the context with `body` replaced by the previous output, so a
/// page template can be wrapped in a site-wide layout. Template files are
/// read once per renderer.
#[derive(Debug, Default)]
pub struct TemplateRenderer {
    loaded: RefCell<HashMap<PathBuf, Rc<str>>>,
}

impl TemplateRenderer {
    /// Creates a renderer with an empty template cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn load(&self, path: &Path) -> Result<Rc<str>, ActionError> {
        if let Some(text) = self.loaded.borrow().get(path) {
            return Ok(Rc::clone(text));
        }
        let bytes = std::fs::read(path).map_err(|e| ActionError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let text: Rc<str> = String::from_utf8(bytes)
            .map_err(|_| ActionError::Render {
                template: path.to_path_buf(),
                reason: "template is not valid UTF-8".to_string(),
            })?
            .into();
        self.loaded
            .borrow_mut()
            .insert(path.to_path_buf(), Rc::clone(&text));
        Ok(text)
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, templates: &[PathBuf], context: &Context) -> Result<String, ActionError> {
        let Some((first, rest)) = templates.split_first() else {
            return Ok(context.get(BODY_KEY).unwrap_or_default().to_string());
        };
        let mut output = apply_template(&self.load(first)?, context);
        for template in rest {
            let wrapped = context.clone().with(BODY_KEY, output);
            output = apply_template(&self.load(template)?, &wrapped);
        }
        Ok(output)
    }
}

/// Substitutes `context` into `template`.
pub fn apply_template(template: &str, context: &Context) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('$') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        if let Some(stripped) = after.strip_prefix('$') {
            out.push('$');
            rest = stripped;
            continue;
        }

        let placeholder = after
            .find('$')
            .map(|end| &after[..end])
            .filter(|key| is_key(key));
        match placeholder {
            Some(key) => {
                match context.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('$');
                        out.push_str(key);
                        out.push('$');
                    }
                }
                rest = &after[key.len() + 1..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_key(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
