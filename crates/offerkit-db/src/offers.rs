//! Database operations for the `offers` table.

use chrono::{DateTime, Utc};
use offerkit_core::{OfferStatus, PriceType, PricingFormat};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::offer_items::NewOfferItem;
use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `offers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferRow {
    pub id: i64,
    pub title: Option<String>,
    pub vendor: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    /// Comma-separated tag list; empty string when the offer carries no tags.
    pub tags: String,
    pub status: String,
    pub price_type: String,
    pub pricing_format: String,
    pub markup: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An `offers` row joined with its item count, for list views.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferSummaryRow {
    pub id: i64,
    pub title: Option<String>,
    pub vendor: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub tags: String,
    pub status: String,
    pub price_type: String,
    pub pricing_format: String,
    pub markup: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub item_count: i64,
}

/// Fields for a new or replacing offer header. Status is never part of this:
/// new offers always start `pending` and later changes go through
/// [`claim_offer_transition`].
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub title: Option<String>,
    pub vendor: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub tags: String,
    pub price_type: PriceType,
    pub pricing_format: PricingFormat,
    pub markup: Option<Decimal>,
    pub discount: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// offers operations
// ---------------------------------------------------------------------------

/// Creates an offer and its items in one transaction.
///
/// The offer starts in `pending` status. Returns the full newly-created
/// header row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; nothing is persisted in
/// that case.
pub async fn create_offer_with_items(
    pool: &PgPool,
    offer: &NewOffer,
    items: &[NewOfferItem],
) -> Result<OfferRow, DbError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, OfferRow>(
        "INSERT INTO offers \
             (title, vendor, starts_at, ends_at, tags, price_type, pricing_format, markup, discount) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id, title, vendor, starts_at, ends_at, tags, status, \
                   price_type, pricing_format, markup, discount, created_at, updated_at",
    )
    .bind(offer.title.as_deref())
    .bind(&offer.vendor)
    .bind(offer.starts_at)
    .bind(offer.ends_at)
    .bind(&offer.tags)
    .bind(offer.price_type.as_str())
    .bind(offer.pricing_format.as_str())
    .bind(offer.markup)
    .bind(offer.discount)
    .fetch_one(&mut *tx)
    .await?;

    for item in items {
        sqlx::query("INSERT INTO offer_items (offer_id, sku, offer_price) VALUES ($1, $2, $3)")
            .bind(row.id)
            .bind(&item.sku)
            .bind(item.offer_price)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(row)
}

/// Fetches a single offer by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_offer(pool: &PgPool, id: i64) -> Result<Option<OfferRow>, DbError> {
    let row = sqlx::query_as::<_, OfferRow>(
        "SELECT id, title, vendor, starts_at, ends_at, tags, status, \
                price_type, pricing_format, markup, discount, created_at, updated_at \
         FROM offers \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns up to `limit` offers with their item counts, newest first,
/// optionally filtered to one status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_offers(
    pool: &PgPool,
    status: Option<&str>,
    limit: i64,
) -> Result<Vec<OfferSummaryRow>, DbError> {
    let rows = match status {
        Some(status) => {
            sqlx::query_as::<_, OfferSummaryRow>(
                "SELECT o.id, o.title, o.vendor, o.starts_at, o.ends_at, o.tags, o.status, \
                        o.price_type, o.pricing_format, o.markup, o.discount, \
                        o.created_at, o.updated_at, COUNT(i.id) AS item_count \
                 FROM offers o \
                 LEFT JOIN offer_items i ON i.offer_id = o.id \
                 WHERE o.status = $1 \
                 GROUP BY o.id \
                 ORDER BY o.created_at DESC, o.id DESC \
                 LIMIT $2",
            )
            .bind(status)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, OfferSummaryRow>(
                "SELECT o.id, o.title, o.vendor, o.starts_at, o.ends_at, o.tags, o.status, \
                        o.price_type, o.pricing_format, o.markup, o.discount, \
                        o.created_at, o.updated_at, COUNT(i.id) AS item_count \
                 FROM offers o \
                 LEFT JOIN offer_items i ON i.offer_id = o.id \
                 GROUP BY o.id \
                 ORDER BY o.created_at DESC, o.id DESC \
                 LIMIT $1",
            )
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}

/// Replaces an offer's header fields, and optionally its items, in one
/// transaction. Only `pending` offers are editable.
///
/// The offer row is locked first so a concurrent activation cannot slip in
/// between the status check and the write.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the offer does not exist,
/// [`DbError::InvalidOfferTransition`] if it is not `pending`, or
/// [`DbError::Sqlx`] on query failure.
pub async fn update_offer_with_items(
    pool: &PgPool,
    id: i64,
    offer: &NewOffer,
    replacement_items: Option<&[NewOfferItem]>,
) -> Result<OfferRow, DbError> {
    let mut tx = pool.begin().await?;

    let status: Option<String> =
        sqlx::query_scalar("SELECT status FROM offers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

    match status.as_deref() {
        None => return Err(DbError::NotFound),
        Some("pending") => {}
        Some(_) => {
            return Err(DbError::InvalidOfferTransition {
                id,
                expected_status: "pending",
            })
        }
    }

    let row = sqlx::query_as::<_, OfferRow>(
        "UPDATE offers \
         SET title = $2, vendor = $3, starts_at = $4, ends_at = $5, tags = $6, \
             price_type = $7, pricing_format = $8, markup = $9, discount = $10, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, title, vendor, starts_at, ends_at, tags, status, \
                   price_type, pricing_format, markup, discount, created_at, updated_at",
    )
    .bind(id)
    .bind(offer.title.as_deref())
    .bind(&offer.vendor)
    .bind(offer.starts_at)
    .bind(offer.ends_at)
    .bind(&offer.tags)
    .bind(offer.price_type.as_str())
    .bind(offer.pricing_format.as_str())
    .bind(offer.markup)
    .bind(offer.discount)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(items) = replacement_items {
        sqlx::query("DELETE FROM offer_items WHERE offer_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for item in items {
            sqlx::query("INSERT INTO offer_items (offer_id, sku, offer_price) VALUES ($1, $2, $3)")
                .bind(id)
                .bind(&item.sku)
                .bind(item.offer_price)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(row)
}

/// Deletes an offer in any status; items go with it via cascade.
///
/// Deleting an active offer discards the captured original prices, so the
/// catalog keeps whatever the activation wrote. That is the caller's call to
/// make. Returns whether a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_offer(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM offers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Atomically advances an offer from one status to another.
///
/// The guarded UPDATE only matches while the offer still holds `from`, so of
/// two concurrent callers exactly one wins; the loser gets
/// [`DbError::InvalidOfferTransition`].
///
/// # Errors
///
/// Returns [`DbError::InvalidOfferTransition`] if the offer is missing or no
/// longer in `from`, or [`DbError::Sqlx`] if the update fails.
pub async fn claim_offer_transition(
    pool: &PgPool,
    id: i64,
    from: OfferStatus,
    to: OfferStatus,
) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE offers SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2")
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidOfferTransition {
            id,
            expected_status: from.as_str(),
        });
    }

    Ok(())
}

/// Pending offers whose start date has arrived, oldest window first.
///
/// Offers without a start date never come due; they are activated manually.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_due_pending_offers(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<Vec<OfferRow>, DbError> {
    let rows = sqlx::query_as::<_, OfferRow>(
        "SELECT id, title, vendor, starts_at, ends_at, tags, status, \
                price_type, pricing_format, markup, discount, created_at, updated_at \
         FROM offers \
         WHERE status = 'pending' AND starts_at IS NOT NULL AND starts_at <= $1 \
         ORDER BY starts_at ASC, id ASC",
    )
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Active offers whose end date has passed, oldest window first.
///
/// Offers without an end date stay active until reverted manually.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_due_active_offers(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<Vec<OfferRow>, DbError> {
    let rows = sqlx::query_as::<_, OfferRow>(
        "SELECT id, title, vendor, starts_at, ends_at, tags, status, \
                price_type, pricing_format, markup, discount, created_at, updated_at \
         FROM offers \
         WHERE status = 'active' AND ends_at IS NOT NULL AND ends_at < $1 \
         ORDER BY ends_at ASC, id ASC",
    )
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
