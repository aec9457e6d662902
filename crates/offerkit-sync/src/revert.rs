//! Revert: restore the catalog prices an activation replaced.

use offerkit_core::{parse_tag_list, remove_tags, OfferStatus};
use offerkit_db::{
    claim_offer_transition, count_revertable_items, get_offer, list_revertable_items,
    mark_item_reverted, DbError, OfferItemRow, OfferRow,
};
use offerkit_shopify::AdminClient;
use sqlx::PgPool;

use crate::{mutation_landed, ItemOutcome, SyncError, SyncReport};

/// Restores an active offer's original prices, or resumes an interrupted
/// restore.
///
/// Mirrors [`crate::activate`]: the `active -> completed` transition is
/// claimed up front, and a `completed` offer that still has unreverted items
/// is resumed. Only items that were actually synced (and so hold a captured
/// original price) are touched; items whose activation never landed have
/// nothing to restore and are left alone.
///
/// Per item the original price is written back and the offer's tags are
/// removed from the owning product. For regular offers the captured price is
/// the offer price itself, so the "restore" rewrites the same value.
///
/// # Errors
///
/// Returns [`SyncError::OfferNotFound`] for an unknown id,
/// [`SyncError::InvalidTransition`] when the offer cannot be reverted from
/// its current status, or [`SyncError::Db`] when local bookkeeping fails.
pub async fn revert(
    pool: &PgPool,
    client: &AdminClient,
    offer_id: i64,
) -> Result<SyncReport, SyncError> {
    let offer = get_offer(pool, offer_id)
        .await?
        .ok_or(SyncError::OfferNotFound(offer_id))?;

    match offer.status.as_str() {
        "active" => {
            match claim_offer_transition(pool, offer_id, OfferStatus::Active, OfferStatus::Completed)
                .await
            {
                Ok(()) => {}
                Err(DbError::InvalidOfferTransition { .. }) => {
                    return Err(SyncError::InvalidTransition {
                        id: offer_id,
                        expected: OfferStatus::Active.as_str(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
        "completed" => {
            if count_revertable_items(pool, offer_id).await? == 0 {
                return Err(SyncError::InvalidTransition {
                    id: offer_id,
                    expected: OfferStatus::Active.as_str(),
                });
            }
            tracing::info!(offer_id, "offer already completed with unreverted items, resuming");
        }
        _ => {
            return Err(SyncError::InvalidTransition {
                id: offer_id,
                expected: OfferStatus::Active.as_str(),
            });
        }
    }

    let items = list_revertable_items(pool, offer_id).await?;
    let offer_tags = parse_tag_list(&offer.tags);

    let mut report = SyncReport::default();
    for item in &items {
        match restore_item(pool, client, &offer, &offer_tags, item).await? {
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
        "revert pass finished"
    );
    Ok(report)
}

/// Restores one item: write back the captured price, strip the offer's tags,
/// then record the revert marker.
async fn restore_item(
    pool: &PgPool,
    client: &AdminClient,
    offer: &OfferRow,
    offer_tags: &[String],
    item: &OfferItemRow,
) -> Result<ItemOutcome, SyncError> {
    let Some(original_price) = item.original_price else {
        // list_revertable_items only returns items with a captured price.
        return Ok(ItemOutcome::SkuMiss);
    };

    let hit = match client.variant_by_sku(&item.sku).await {
        Ok(Some(hit)) => hit,
        Ok(None) => {
            tracing::warn!(
                offer_id = offer.id,
                sku = %item.sku,
                "variant gone from catalog, nothing to restore"
            );
            return Ok(ItemOutcome::SkuMiss);
        }
        Err(e) => {
            tracing::error!(offer_id = offer.id, sku = %item.sku, error = %e, "variant lookup failed");
            return Ok(ItemOutcome::Failed);
        }
    };

    let price = original_price.to_string();
    let result = client
        .update_variant_price(&hit.product_id, &hit.variant_id, &price)
        .await;
    if !mutation_landed(result, offer.id, &item.sku, "price restore") {
        return Ok(ItemOutcome::Failed);
    }

    if !offer_tags.is_empty() {
        let remaining = remove_tags(&hit.tags, offer_tags);
        let result = client.update_product_tags(&hit.product_id, &remaining).await;
        if !mutation_landed(result, offer.id, &item.sku, "tag removal") {
            return Ok(ItemOutcome::Failed);
        }
    }

    mark_item_reverted(pool, item.id).await?;
    Ok(ItemOutcome::Done)
}
