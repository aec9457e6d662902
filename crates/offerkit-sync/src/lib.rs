//! Price synchronization between stored offers and the live catalog.
//!
//! An offer moves `pending -> active -> completed`. [`activate`] pushes the
//! offer's prices (and tags) onto the catalog and records what was there
//! before; [`revert`] restores what was recorded. [`run_sweep`] drives both
//! from the clock, moving every offer whose window has opened or closed.
//!
//! All three take the pool and the Admin API client as arguments so callers
//! (HTTP handlers, CLI commands, tests) control connection lifetimes.

mod activate;
mod error;
mod revert;
mod sweep;

pub use activate::activate;
pub use error::SyncError;
pub use revert::revert;
pub use sweep::{run_sweep, SweepReport};

use offerkit_shopify::{ShopifyError, UserError};
use serde::Serialize;

/// Per-item outcome counts for one activation or revert pass.
///
/// Counts cover only the items this invocation worked through; a resumed
/// pass does not re-count items finished by an earlier one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Items whose remote writes landed and whose sync marker was recorded.
    pub matched: u32,
    /// Items whose SKU matched nothing in the catalog.
    pub skipped: u32,
    /// Items whose remote write failed or was rejected. They keep no marker,
    /// so a later pass retries them.
    pub failed: u32,
}

/// How a single item fared within a pass.
pub(crate) enum ItemOutcome {
    Done,
    SkuMiss,
    Failed,
}

/// Collapses a mutation result into whether the write landed. API-level
/// `userErrors` and transport failures are logged against the item and
/// absorbed; they never abort the surrounding loop.
pub(crate) fn mutation_landed(
    result: Result<Vec<UserError>, ShopifyError>,
    offer_id: i64,
    sku: &str,
    what: &'static str,
) -> bool {
    match result {
        Ok(errors) if errors.is_empty() => true,
        Ok(errors) => {
            for err in &errors {
                tracing::warn!(offer_id, sku, error = %err.message, "{what} rejected by the admin api");
            }
            false
        }
        Err(e) => {
            tracing::error!(offer_id, sku, error = %e, "{what} failed");
            false
        }
    }
}
