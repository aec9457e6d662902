//! Offer lifecycle command handlers for the CLI.
//!
//! These are called from `main` after the database pool and config are
//! established. Each builds a Shopify Admin client from config, drives the
//! synchronizer directly, and prints a one-line report. Intended for
//! operators and cron-style scheduling where the HTTP API is not in play.

use offerkit_core::AppConfig;
use offerkit_shopify::AdminClient;

fn admin_client(config: &AppConfig) -> anyhow::Result<AdminClient> {
    AdminClient::from_app_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build Shopify admin client: {e}"))
}

/// Run one sweep pass over every due offer.
///
/// # Errors
///
/// Returns an error if the Shopify client cannot be constructed or a
/// due-offer query fails. Per-offer sync failures are logged and skipped
/// inside the sweep, not propagated.
pub(crate) async fn run_sweep(pool: &sqlx::PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let client = admin_client(config)?;

    let report = offerkit_sync::run_sweep(pool, &client).await?;
    println!(
        "sweep finished: {} offers activated, {} reverted",
        report.activated, report.reverted
    );
    Ok(())
}

/// Activate one offer now, pushing its prices and tags to the shop.
///
/// # Errors
///
/// Returns an error if the Shopify client cannot be constructed, the offer
/// does not exist, or it is not in a status activation can start from.
/// Per-item failures are logged and reflected in the printed counts.
pub(crate) async fn run_activate(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    offer_id: i64,
) -> anyhow::Result<()> {
    let client = admin_client(config)?;

    let report = offerkit_sync::activate(pool, &client, offer_id).await?;
    println!(
        "offer {offer_id} activated: {} items matched, {} skipped, {} failed",
        report.matched, report.skipped, report.failed
    );
    Ok(())
}

/// Revert one offer now, restoring the prices captured at activation.
///
/// # Errors
///
/// Returns an error if the Shopify client cannot be constructed, the offer
/// does not exist, or it is not in a status a revert can start from.
/// Per-item failures are logged and reflected in the printed counts.
pub(crate) async fn run_revert(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    offer_id: i64,
) -> anyhow::Result<()> {
    let client = admin_client(config)?;

    let report = offerkit_sync::revert(pool, &client, offer_id).await?;
    println!(
        "offer {offer_id} reverted: {} items matched, {} skipped, {} failed",
        report.matched, report.skipped, report.failed
    );
    Ok(())
}
