//! `kiln inspect`: prints the cached context of one page.

use std::path::Path;

use kiln_cache::CacheError;
use kiln_common::Context;

use crate::project::Project;
use crate::{GlobalArgs, InspectArgs, ReportFormat};

/// Runs the `kiln inspect` command.
pub fn run(args: &InspectArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;
    let context = load_context(&project, &args.url)?;
    println!("{}", format_context(&context, args.format)?);
    Ok(0)
}

/// Loads the cached context stored for `url`.
pub fn load_context(project: &Project, url: &str) -> Result<Context, Box<dyn std::error::Error>> {
    match project.cache_store().load(Path::new(url)) {
        Ok(context) => Ok(context),
        Err(CacheError::NotFound { .. }) => {
            Err(format!("no cached result for '{url}'; run `kiln build` first").into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Formats a context as `key = value` lines sorted by key, or as JSON.
pub fn format_context(
    context: &Context,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(context
            .iter()
            .map(|(key, value)| format!("{key} = {value}"))
            .collect::<Vec<_>>()
            .join("\n")),
        ReportFormat::Json => serde_json::to_string_pretty(context),
    }
}
