//! Configuration file loading and validation.

use std::path::{Component, Path};

use crate::error::ConfigError;
use crate::types::SiteConfig;

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Loads and validates a `kiln.toml` configuration from a project directory.
///
/// Reads `<project_dir>/kiln.toml`, parses it, and validates required fields.
pub fn load_config(project_dir: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `kiln.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let site = &config.site;
    if site.name.is_empty() {
        return Err(ConfigError::MissingField("site.name".to_string()));
    }
    for (field, value) in [
        ("site.source", &site.source),
        ("site.cache_dir", &site.cache_dir),
        ("site.output_dir", &site.output_dir),
    ] {
        if value.is_empty() {
            return Err(ConfigError::MissingField(field.to_string()));
        }
    }
    if Path::new(&site.cache_dir) == Path::new(&site.output_dir) {
        return Err(ConfigError::ValidationError(
            "site.cache_dir and site.output_dir must differ".to_string(),
        ));
    }

    for (i, listing) in config.listings.iter().enumerate() {
        if listing.url.is_empty() {
            return Err(ConfigError::MissingField(format!("listings[{i}].url")));
        }
        if !is_contained(&listing.url) {
            return Err(ConfigError::ValidationError(format!(
                "listings[{i}].url '{}' must be a relative path inside the output directory",
                listing.url
            )));
        }
        if !is_contained(&listing.pages) {
            return Err(ConfigError::ValidationError(format!(
                "listings[{i}].pages '{}' must be a relative path inside the source directory",
                listing.pages
            )));
        }
        if listing.item_templates.is_empty() {
            return Err(ConfigError::MissingField(format!(
                "listings[{i}].item_templates"
            )));
        }
    }
    Ok(())
}

/// Returns `true` if `path` is relative and never steps outside its root.
fn is_contained(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
