use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use offerkit_core::OfferStatus;

use crate::middleware::RequestId;

use super::super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use super::resolve_offer;

#[derive(Debug, Serialize)]
pub(in crate::api) struct OfferSummaryItem {
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

#[derive(Debug, Serialize)]
pub(in crate::api) struct OfferDetail {
    id: i64,
    title: Option<String>,
    vendor: String,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    tags: String,
    status: String,
    price_type: String,
    pricing_format: String,
    markup: Option<Decimal>,
    discount: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    items: Vec<OfferItemView>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct OfferItemView {
    id: i64,
    sku: String,
    offer_price: Decimal,
    original_price: Option<Decimal>,
    synced_at: Option<DateTime<Utc>>,
    reverted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ListOffersQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/v1/offers — newest offers first, optionally filtered by status.
pub(in crate::api) async fn list_offers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListOffersQuery>,
) -> Result<Json<ApiResponse<Vec<OfferSummaryItem>>>, ApiError> {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => Some(raw.parse::<OfferStatus>().map_err(|_| {
            ApiError::new(
                &req_id.0,
                "validation_error",
                format!("status must be 'pending', 'active', or 'completed', got '{raw}'"),
            )
        })?),
    };

    let rows = offerkit_db::list_offers(
        &state.pool,
        status.map(OfferStatus::as_str),
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| OfferSummaryItem {
            id: row.id,
            title: row.title,
            vendor: row.vendor,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            tags: row.tags,
            status: row.status,
            price_type: row.price_type,
            pricing_format: row.pricing_format,
            markup: row.markup,
            discount: row.discount,
            created_at: row.created_at,
            updated_at: row.updated_at,
            item_count: row.item_count,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/offers/:id — one offer header with its full item list.
pub(in crate::api) async fn get_offer(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OfferDetail>>, ApiError> {
    let offer = resolve_offer(&state.pool, id, &req_id.0).await?;

    let items = offerkit_db::list_offer_items(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .into_iter()
        .map(|item| OfferItemView {
            id: item.id,
            sku: item.sku,
            offer_price: item.offer_price,
            original_price: item.original_price,
            synced_at: item.synced_at,
            reverted_at: item.reverted_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data: OfferDetail {
            id: offer.id,
            title: offer.title,
            vendor: offer.vendor,
            starts_at: offer.starts_at,
            ends_at: offer.ends_at,
            tags: offer.tags,
            status: offer.status,
            price_type: offer.price_type,
            pricing_format: offer.pricing_format,
            markup: offer.markup,
            discount: offer.discount,
            created_at: offer.created_at,
            updated_at: offer.updated_at,
            items,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
