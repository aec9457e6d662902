//! Database operations for the `offer_items` table.
//!
//! Items carry two progress markers the synchronizer leans on to resume an
//! interrupted pass: `synced_at` (offer price pushed) and `reverted_at`
//! (original price restored). `original_price` is written once, at first
//! successful sync, and never overwritten afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `offer_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferItemRow {
    pub id: i64,
    pub offer_id: i64,
    pub sku: String,
    pub offer_price: Decimal,
    pub original_price: Option<Decimal>,
    pub synced_at: Option<DateTime<Utc>>,
    pub reverted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new offer item.
#[derive(Debug, Clone)]
pub struct NewOfferItem {
    pub sku: String,
    pub offer_price: Decimal,
}

// ---------------------------------------------------------------------------
// offer_items operations
// ---------------------------------------------------------------------------

/// Returns all items of an offer in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_offer_items(pool: &PgPool, offer_id: i64) -> Result<Vec<OfferItemRow>, DbError> {
    let rows = sqlx::query_as::<_, OfferItemRow>(
        "SELECT id, offer_id, sku, offer_price, original_price, synced_at, reverted_at, created_at \
         FROM offer_items \
         WHERE offer_id = $1 \
         ORDER BY id ASC",
    )
    .bind(offer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Items of an offer whose offer price has not been pushed remotely yet.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_unsynced_items(
    pool: &PgPool,
    offer_id: i64,
) -> Result<Vec<OfferItemRow>, DbError> {
    let rows = sqlx::query_as::<_, OfferItemRow>(
        "SELECT id, offer_id, sku, offer_price, original_price, synced_at, reverted_at, created_at \
         FROM offer_items \
         WHERE offer_id = $1 AND synced_at IS NULL \
         ORDER BY id ASC",
    )
    .bind(offer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Number of items still waiting to be synced for an offer.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_unsynced_items(pool: &PgPool, offer_id: i64) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM offer_items WHERE offer_id = $1 AND synced_at IS NULL",
    )
    .bind(offer_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Items of an offer that were synced, hold a captured original price, and
/// have not been reverted yet.
///
/// Items that never synced (for example because their SKU matched nothing)
/// have no remote change to undo and are excluded.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_revertable_items(
    pool: &PgPool,
    offer_id: i64,
) -> Result<Vec<OfferItemRow>, DbError> {
    let rows = sqlx::query_as::<_, OfferItemRow>(
        "SELECT id, offer_id, sku, offer_price, original_price, synced_at, reverted_at, created_at \
         FROM offer_items \
         WHERE offer_id = $1 AND synced_at IS NOT NULL AND reverted_at IS NULL \
               AND original_price IS NOT NULL \
         ORDER BY id ASC",
    )
    .bind(offer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Number of items still waiting to be reverted for an offer.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_revertable_items(pool: &PgPool, offer_id: i64) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM offer_items \
         WHERE offer_id = $1 AND synced_at IS NOT NULL AND reverted_at IS NULL \
               AND original_price IS NOT NULL",
    )
    .bind(offer_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Records a successful price push for one item.
///
/// Sets `synced_at` and captures `original_price`; `COALESCE` keeps the
/// first captured value if a resumed pass syncs the same item again.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the item does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn mark_item_synced(
    pool: &PgPool,
    item_id: i64,
    original_price: Decimal,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE offer_items \
         SET original_price = COALESCE(original_price, $2), synced_at = NOW() \
         WHERE id = $1",
    )
    .bind(item_id)
    .bind(original_price)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Records a successful price restore for one item.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the item does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn mark_item_reverted(pool: &PgPool, item_id: i64) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE offer_items SET reverted_at = NOW() WHERE id = $1")
        .bind(item_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
