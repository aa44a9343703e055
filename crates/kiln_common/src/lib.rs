//! Shared foundational types used across the Kiln site generator.
//!
//! This crate provides the [`Context`] mapping every build action produces and
//! the [`SiteLayout`] that maps logical paths to cache files, output URLs and
//! destination files.

#![warn(missing_docs)]

pub mod context;
pub mod layout;

pub use context::{Context, BODY_KEY, PATH_KEY, ROOT_KEY, URL_KEY};
pub use layout::{cache_location, canonical_url, normalize, output_url, relative_root, SiteLayout};
