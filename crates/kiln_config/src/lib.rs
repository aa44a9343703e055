//! Parsing and validation of `kiln.toml` site configuration files.
//!
//! This crate reads the site configuration file and produces a strongly-typed
//! [`SiteConfig`] describing the source tree, template chain, cache and output
//! roots, and listing pages.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;
