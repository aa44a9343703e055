//! Deferred, dependency-tracked build actions.
//!
//! An [`Action`] bundles the files a computation reads, the URL its result is
//! rendered to, and a [`Producer`] that performs the computation on demand.
//! Combinators in [`combinators`] build page, custom-page and listing actions
//! and merge actions without running them; [`run_cached`] runs an action
//! through a [`CacheStore`](kiln_cache::CacheStore).

#![warn(missing_docs)]

pub mod action;
pub mod collab;
pub mod combinators;
pub mod error;
pub mod protocol;

pub use action::{Action, Producer};
pub use collab::{PageReader, Renderer};
pub use combinators::{
    combine, combine_with_url, create_custom_page, create_listing, create_page, Association,
};
pub use error::ActionError;
pub use protocol::{run_cached, Outcome};
