//! Running actions through the build cache.

use std::path::Path;

use kiln_cache::CacheStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::action::Action;
use crate::error::ActionError;

/// How a result was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Loaded from a fresh cache entry.
    Cached,
    /// Computed by running the producer.
    Built,
}

/// Returns the action's value, reusing the cached one when it is fresh.
///
/// Actions without a URL are always produced and never cached. Otherwise the
/// entry keyed by the URL is loaded if it is fresh with respect to the
/// action's dependencies; an entry that turns out to be missing or unreadable
/// is rebuilt. A rebuilt value is stored back before it is returned.
pub fn run_cached<T>(action: &Action<T>, store: &CacheStore) -> Result<(T, Outcome), ActionError>
where
    T: Serialize + DeserializeOwned,
{
    let Some(url) = action.url() else {
        return Ok((action.produce()?, Outcome::Built));
    };
    let logical = Path::new(url);

    if store.is_fresh(logical, action.dependencies())? {
        match store.load(logical) {
            Ok(value) => {
                debug!(url, "using cached result");
                return Ok((value, Outcome::Cached));
            }
            Err(e) if e.is_rebuild_worthy() => {
                warn!(url, error = %e, "discarding unreadable cache entry");
            }
            Err(e) => return Err(e.into()),
        }
    }

    debug!(url, "building");
    let value = action.produce()?;
    store.store(&value, logical)?;
    Ok((value, Outcome::Built))
}
