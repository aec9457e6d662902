//! One-shot scan that moves due offers through their lifecycle.
//!
//! The sweep runs when invoked (HTTP endpoint or CLI command); there is no
//! background timer. Each qualifying offer is handed to the synchronizer,
//! and a failure on one offer never stops the rest of the batch.

use chrono::Utc;
use offerkit_shopify::AdminClient;
use serde::Serialize;
use sqlx::PgPool;

use crate::{activate, revert, SyncError};

/// Counts of offers moved by one sweep invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Pending offers whose window had opened and were activated.
    pub activated: u32,
    /// Active offers whose window had closed and were reverted.
    pub reverted: u32,
}

/// Activates every pending offer whose start date has arrived and reverts
/// every active offer whose end date has passed.
///
/// Both phases compare against a single timestamp taken at entry. Offers a
/// concurrent caller claimed first are skipped; other per-offer failures are
/// logged and the sweep moves on. A sweep with nothing due returns zero
/// counts without touching the catalog.
///
/// # Errors
///
/// Returns [`SyncError::Db`] if the due-offer queries themselves fail.
pub async fn run_sweep(pool: &PgPool, client: &AdminClient) -> Result<SweepReport, SyncError> {
    let now = Utc::now();
    let mut report = SweepReport::default();

    for offer in offerkit_db::list_due_pending_offers(pool, now).await? {
        match activate(pool, client, offer.id).await {
            Ok(sync) => {
                report.activated += 1;
                tracing::info!(
                    offer_id = offer.id,
                    matched = sync.matched,
                    skipped = sync.skipped,
                    failed = sync.failed,
                    "sweep activated offer"
                );
            }
            Err(SyncError::InvalidTransition { .. }) => {
                tracing::info!(offer_id = offer.id, "offer claimed elsewhere, skipping");
            }
            Err(e) => {
                tracing::error!(offer_id = offer.id, error = %e, "sweep activation failed");
            }
        }
    }

    for offer in offerkit_db::list_due_active_offers(pool, now).await? {
        match revert(pool, client, offer.id).await {
            Ok(sync) => {
                report.reverted += 1;
                tracing::info!(
                    offer_id = offer.id,
                    matched = sync.matched,
                    skipped = sync.skipped,
                    failed = sync.failed,
                    "sweep reverted offer"
                );
            }
            Err(SyncError::InvalidTransition { .. }) => {
                tracing::info!(offer_id = offer.id, "offer claimed elsewhere, skipping");
            }
            Err(e) => {
                tracing::error!(offer_id = offer.id, error = %e, "sweep revert failed");
            }
        }
    }

    tracing::info!(
        activated = report.activated,
        reverted = report.reverted,
        "sweep finished"
    );
    Ok(report)
}
