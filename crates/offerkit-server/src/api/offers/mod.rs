//! Offer API handlers.
//!
//! - `GET    /api/v1/offers`                — offer list with item counts
//! - `POST   /api/v1/offers`                — create an offer from a CSV upload
//! - `GET    /api/v1/offers/:id`            — offer header plus items
//! - `PUT    /api/v1/offers/:id`            — edit a pending offer
//! - `DELETE /api/v1/offers/:id`            — delete an offer in any status
//! - `POST   /api/v1/offers/:id/activate`   — push prices live now
//! - `POST   /api/v1/offers/:id/revert`     — restore original prices now
//! - `POST   /api/v1/offers/sweep`          — move every due offer
//! - `GET    /api/v1/offers/sample-csv`     — downloadable CSV template

mod lifecycle;
mod list;
mod sample;
mod write;

pub(super) use lifecycle::{activate_offer, revert_offer, sweep_offers};
pub(super) use list::{get_offer, list_offers, OfferSummaryItem};
pub(super) use sample::sample_csv;
pub(super) use write::{create_offer, delete_offer, update_offer};

use super::{map_db_error, ApiError};

/// Resolve an offer id to its row, returning 404 if not found.
async fn resolve_offer(
    pool: &sqlx::PgPool,
    id: i64,
    request_id: &str,
) -> Result<offerkit_db::OfferRow, ApiError> {
    offerkit_db::get_offer(pool, id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?
        .ok_or_else(|| ApiError::new(request_id, "not_found", format!("offer {id} not found")))
}
