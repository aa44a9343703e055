//! Incremental build cache.
//!
//! This crate persists build results under a cache root, one entry per logical
//! path, and decides whether an entry is still fresh by comparing its
//! modification time against the files it was derived from.

#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod freshness;
pub mod store;

pub use error::CacheError;
pub use freshness::Staleness;
pub use store::CacheStore;
