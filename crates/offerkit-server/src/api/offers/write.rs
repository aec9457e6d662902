//! Offer write handlers: create from a CSV upload, edit, delete.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use offerkit_core::{compute_offer_price, parse_items, parse_tag_list, PriceType, PricingFormat};
use offerkit_db::{NewOffer, NewOfferItem};

use crate::middleware::RequestId;

use super::super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Form handling
// ---------------------------------------------------------------------------

/// Raw multipart submission: metadata text fields plus the `items` CSV file.
#[derive(Debug, Default)]
struct OfferForm {
    title: Option<String>,
    vendor: Option<String>,
    starts_at: Option<String>,
    ends_at: Option<String>,
    tags: Option<String>,
    price_type: Option<String>,
    pricing_format: Option<String>,
    markup: Option<String>,
    discount: Option<String>,
    items_csv: Option<String>,
}

/// Everything validated and converted, ready for the db layer.
struct ValidatedOffer {
    offer: NewOffer,
    items: Option<Vec<NewOfferItem>>,
}

async fn read_form(request_id: &str, multipart: &mut Multipart) -> Result<OfferForm, ApiError> {
    let mut form = OfferForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::new(
            request_id,
            "bad_request",
            format!("malformed multipart body: {e}"),
        )
    })? {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        if name == "items" {
            // The body-limit layer surfaces oversized uploads here.
            let bytes = field.bytes().await.map_err(|e| {
                ApiError::new(
                    request_id,
                    "bad_request",
                    format!("failed to read items file: {e}"),
                )
            })?;
            let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
                ApiError::new(
                    request_id,
                    "validation_error",
                    "items file must be UTF-8 text",
                )
            })?;
            form.items_csv = Some(text);
            continue;
        }

        let value = field.text().await.map_err(|e| {
            ApiError::new(
                request_id,
                "bad_request",
                format!("failed to read field '{name}': {e}"),
            )
        })?;
        match name.as_str() {
            "title" => form.title = Some(value),
            "vendor" => form.vendor = Some(value),
            "starts_at" => form.starts_at = Some(value),
            "ends_at" => form.ends_at = Some(value),
            "tags" => form.tags = Some(value),
            "price_type" => form.price_type = Some(value),
            "pricing_format" => form.pricing_format = Some(value),
            "markup" => form.markup = Some(value),
            "discount" => form.discount = Some(value),
            _ => {}
        }
    }

    Ok(form)
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn parse_price_type(request_id: &str, value: Option<&str>) -> Result<PriceType, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(PriceType::Offer),
        Some(raw) => raw.parse().map_err(|_| {
            ApiError::new(
                request_id,
                "validation_error",
                format!("price_type must be 'offer' or 'regular', got '{raw}'"),
            )
        }),
    }
}

fn parse_pricing_format(request_id: &str, value: Option<&str>) -> Result<PricingFormat, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(PricingFormat::Actual),
        Some(raw) => raw.parse().map_err(|_| {
            ApiError::new(
                request_id,
                "validation_error",
                format!("pricing_format must be 'actual' or 'base', got '{raw}'"),
            )
        }),
    }
}

fn parse_timestamp(
    request_id: &str,
    field: &str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|_| {
            ApiError::new(
                request_id,
                "validation_error",
                format!("'{field}' must be an RFC 3339 timestamp, got '{raw}'"),
            )
        })
}

fn parse_decimal(
    request_id: &str,
    field: &str,
    value: Option<&str>,
) -> Result<Option<Decimal>, ApiError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<Decimal>().map(Some).map_err(|_| {
        ApiError::new(
            request_id,
            "validation_error",
            format!("'{field}' must be a decimal number, got '{raw}'"),
        )
    })
}

/// Parses the CSV and computes each item's final price up front, so a bad
/// file rejects the whole request before anything is written.
fn build_items(
    request_id: &str,
    text: &str,
    format: PricingFormat,
    markup: Option<Decimal>,
    discount: Option<Decimal>,
) -> Result<Vec<NewOfferItem>, ApiError> {
    let parsed = parse_items(text, format)
        .map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))?;
    if parsed.is_empty() {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "items file contains no rows",
        ));
    }

    parsed
        .into_iter()
        .map(|item| {
            let offer_price = compute_offer_price(&item.price, format, markup, discount)
                .map_err(|e| {
                    ApiError::new(
                        request_id,
                        "validation_error",
                        format!("item '{}': {e}", item.sku),
                    )
                })?;
            Ok(NewOfferItem {
                sku: item.sku,
                offer_price,
            })
        })
        .collect()
}

fn validate_form(
    request_id: &str,
    form: OfferForm,
    items_required: bool,
) -> Result<ValidatedOffer, ApiError> {
    let vendor = form.vendor.as_deref().map(str::trim).unwrap_or_default();
    if vendor.is_empty() {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "vendor is required",
        ));
    }

    let price_type = parse_price_type(request_id, form.price_type.as_deref())?;
    let pricing_format = parse_pricing_format(request_id, form.pricing_format.as_deref())?;

    let starts_at = parse_timestamp(request_id, "starts_at", form.starts_at.as_deref())?;
    let ends_at = parse_timestamp(request_id, "ends_at", form.ends_at.as_deref())?;
    if price_type == PriceType::Offer && (starts_at.is_none() || ends_at.is_none()) {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "price_type 'offer' requires both starts_at and ends_at",
        ));
    }

    let (markup, discount) = match pricing_format {
        PricingFormat::Base => {
            let markup = parse_decimal(request_id, "markup", form.markup.as_deref())?;
            let discount = parse_decimal(request_id, "discount", form.discount.as_deref())?;
            if markup.is_none() || discount.is_none() {
                return Err(ApiError::new(
                    request_id,
                    "validation_error",
                    "pricing_format 'base' requires both markup and discount",
                ));
            }
            (markup, discount)
        }
        // Markup and discount only mean something under the base formula;
        // they are stored null for actual-price offers.
        PricingFormat::Actual => (None, None),
    };

    let tags = form
        .tags
        .as_deref()
        .map(parse_tag_list)
        .unwrap_or_default()
        .join(",");

    let items = match form.items_csv.as_deref() {
        Some(text) => Some(build_items(request_id, text, pricing_format, markup, discount)?),
        None if items_required => {
            return Err(ApiError::new(
                request_id,
                "validation_error",
                "an 'items' CSV file part is required",
            ));
        }
        None => None,
    };

    let title = form
        .title
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty());

    Ok(ValidatedOffer {
        offer: NewOffer {
            title,
            vendor: vendor.to_owned(),
            starts_at,
            ends_at,
            tags,
            price_type,
            pricing_format,
            markup,
            discount,
        },
        items,
    })
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(in crate::api) struct CreateOfferResponse {
    pub id: i64,
    pub status: String,
    pub item_count: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/offers — create an offer from a multipart CSV upload.
pub(in crate::api) async fn create_offer(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<CreateOfferResponse>>), ApiError> {
    let rid = &req_id.0;
    let form = read_form(rid, &mut multipart).await?;
    let validated = validate_form(rid, form, true)?;
    let items = validated.items.unwrap_or_default();

    let row = offerkit_db::create_offer_with_items(&state.pool, &validated.offer, &items)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(
        offer_id = row.id,
        vendor = %row.vendor,
        items = items.len(),
        "offer created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: CreateOfferResponse {
                id: row.id,
                status: row.status,
                item_count: items.len(),
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PUT /api/v1/offers/:id — edit a pending offer. A new `items` file
/// replaces the item set wholesale; omitting it keeps the current items.
pub(in crate::api) async fn update_offer(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let form = read_form(rid, &mut multipart).await?;
    let validated = validate_form(rid, form, false)?;

    offerkit_db::update_offer_with_items(&state.pool, id, &validated.offer, validated.items.as_deref())
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "updated": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/offers/:id — remove an offer and its items, any status.
pub(in crate::api) async fn delete_offer(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;

    let deleted = offerkit_db::delete_offer(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !deleted {
        return Err(ApiError::new(
            rid,
            "not_found",
            format!("offer {id} not found"),
        ));
    }

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
