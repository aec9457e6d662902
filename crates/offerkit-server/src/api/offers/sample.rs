//! Downloadable CSV template, one per pricing format.

use axum::{
    extract::Query,
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;

use offerkit_core::{samples, PricingFormat};

use crate::middleware::RequestId;

use super::super::ApiError;

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SampleCsvQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// GET /api/v1/offers/sample-csv — CSV template for the given pricing
/// format (`?type=actual|base`, defaults to actual).
pub(in crate::api) async fn sample_csv(
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SampleCsvQuery>,
) -> Result<Response, ApiError> {
    let format = match query.kind.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => PricingFormat::Actual,
        Some(raw) => raw.parse().map_err(|_| {
            ApiError::new(
                &req_id.0,
                "validation_error",
                format!("type must be 'actual' or 'base', got '{raw}'"),
            )
        })?,
    };

    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        samples::sample_csv(format),
    )
        .into_response())
}
