//! Handlers that move offers through their lifecycle by driving the
//! synchronizer against the live shop.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use offerkit_sync::{SweepReport, SyncReport};

use crate::middleware::RequestId;

use super::super::{map_sync_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// POST /api/v1/offers/:id/activate — push the offer's prices to the shop
/// and mark it active.
pub(in crate::api) async fn activate_offer(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<SyncReport>>, ApiError> {
    let report = offerkit_sync::activate(&state.pool, &state.shopify, id)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/offers/:id/revert — restore original prices and mark the
/// offer completed.
pub(in crate::api) async fn revert_offer(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<SyncReport>>, ApiError> {
    let report = offerkit_sync::revert(&state.pool, &state.shopify, id)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/offers/sweep — activate every due pending offer and revert
/// every expired active one, right now.
pub(in crate::api) async fn sweep_offers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SweepReport>>, ApiError> {
    let report = offerkit_sync::run_sweep(&state.pool, &state.shopify)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}
