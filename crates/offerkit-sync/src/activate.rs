//! Activation: push an offer's prices and tags onto the catalog.

use offerkit_core::{merge_tags, parse_tag_list, OfferStatus, PriceType};
use offerkit_db::{
    claim_offer_transition, count_unsynced_items, get_offer, list_unsynced_items, mark_item_synced,
    DbError, OfferItemRow, OfferRow,
};
use offerkit_shopify::AdminClient;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{mutation_landed, ItemOutcome, SyncError, SyncReport};

/// Pushes a pending offer's prices live, or resumes an interrupted push.
///
/// The `pending -> active` transition is claimed up front with a guarded
/// update, so of two concurrent callers exactly one proceeds. An offer that
/// is already `active` but still has unsynced items (a pass died partway) is
/// resumed; any other state is an [`SyncError::InvalidTransition`].
///
/// Each unsynced item is resolved by SKU, the price to restore later is
/// captured, the offer price is written, and the offer's tags are merged into
/// the owning product. Catalog misses and rejected writes are logged, leave
/// the item unmarked for a later pass, and never abort the loop.
///
/// # Errors
///
/// Returns [`SyncError::OfferNotFound`] for an unknown id,
/// [`SyncError::InvalidTransition`] when the offer cannot be activated from
/// its current status, or [`SyncError::Db`] when local bookkeeping fails.
pub async fn activate(
    pool: &PgPool,
    client: &AdminClient,
    offer_id: i64,
) -> Result<SyncReport, SyncError> {
    let offer = get_offer(pool, offer_id)
        .await?
        .ok_or(SyncError::OfferNotFound(offer_id))?;

    match offer.status.as_str() {
        "pending" => {
            match claim_offer_transition(pool, offer_id, OfferStatus::Pending, OfferStatus::Active)
                .await
            {
                Ok(()) => {}
                Err(DbError::InvalidOfferTransition { .. }) => {
                    return Err(SyncError::InvalidTransition {
                        id: offer_id,
                        expected: OfferStatus::Pending.as_str(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
        "active" => {
            if count_unsynced_items(pool, offer_id).await? == 0 {
                return Err(SyncError::InvalidTransition {
                    id: offer_id,
                    expected: OfferStatus::Pending.as_str(),
                });
            }
            tracing::info!(offer_id, "offer already active with unsynced items, resuming");
        }
        _ => {
            return Err(SyncError::InvalidTransition {
                id: offer_id,
                expected: OfferStatus::Pending.as_str(),
            });
        }
    }

    let items = list_unsynced_items(pool, offer_id).await?;
    let offer_tags = parse_tag_list(&offer.tags);

    let mut report = SyncReport::default();
    for item in &items {
        match push_item(pool, client, &offer, &offer_tags, item).await? {
            ItemOutcome::Done => report.matched += 1,
            ItemOutcome::SkuMiss => report.skipped += 1,
            ItemOutcome::Failed => report.failed += 1,
        }
    }

    tracing::info!(
        offer_id,
        matched = report.matched,
        skipped = report.skipped,
        failed = report.failed,
        "activation pass finished"
    );
    Ok(report)
}

/// Syncs one item: resolve the SKU, capture the restore price, write the
/// price and tags, then record the sync marker. Remote problems collapse
/// into the returned outcome; only local bookkeeping failures propagate.
async fn push_item(
    pool: &PgPool,
    client: &AdminClient,
    offer: &OfferRow,
    offer_tags: &[String],
    item: &OfferItemRow,
) -> Result<ItemOutcome, SyncError> {
    let hit = match client.variant_by_sku(&item.sku).await {
        Ok(Some(hit)) => hit,
        Ok(None) => {
            tracing::warn!(
                offer_id = offer.id,
                sku = %item.sku,
                "no catalog variant matches sku, skipping item"
            );
            return Ok(ItemOutcome::SkuMiss);
        }
        Err(e) => {
            tracing::error!(offer_id = offer.id, sku = %item.sku, error = %e, "variant lookup failed");
            return Ok(ItemOutcome::Failed);
        }
    };

    // A regular offer is a permanent change: record the new price itself so a
    // revert restores nothing. A temporary offer records the price the
    // catalog held before we touched it.
    let original_price = if offer.price_type == PriceType::Regular.as_str() {
        item.offer_price
    } else {
        match hit.price.parse::<Decimal>() {
            Ok(price) => price,
            Err(e) => {
                tracing::error!(
                    offer_id = offer.id,
                    sku = %item.sku,
                    price = %hit.price,
                    error = %e,
                    "catalog price is not a decimal"
                );
                return Ok(ItemOutcome::Failed);
            }
        }
    };

    let price = item.offer_price.to_string();
    let result = client
        .update_variant_price(&hit.product_id, &hit.variant_id, &price)
        .await;
    if !mutation_landed(result, offer.id, &item.sku, "price update") {
        return Ok(ItemOutcome::Failed);
    }

    if !offer_tags.is_empty() {
        let merged = merge_tags(&hit.tags, offer_tags);
        let result = client.update_product_tags(&hit.product_id, &merged).await;
        if !mutation_landed(result, offer.id, &item.sku, "tag update") {
            // Price went out but tags did not; the item stays unmarked so a
            // resumed pass replays both writes.
            return Ok(ItemOutcome::Failed);
        }
    }

    mark_item_synced(pool, item.id, original_price).await?;
    Ok(ItemOutcome::Done)
}
