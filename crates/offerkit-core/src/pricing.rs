//! Offer price derivation.
//!
//! `actual` format stores the CSV price as-is. `base` format derives the
//! shelf price as `base * markup * (1 - discount / 100)` rounded to two
//! decimal places, midpoints away from zero.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::offer::PricingFormat;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("price '{value}' is not a valid decimal")]
    InvalidPrice { value: String },
    #[error("pricing format 'base' requires markup and discount")]
    MissingBaseInputs,
}

/// Compute the price to push for one item from its raw CSV price cell.
///
/// # Errors
///
/// Returns `PricingError` if the cell is not a decimal, or the format is
/// `base` and markup/discount are absent.
pub fn compute_offer_price(
    raw_price: &str,
    format: PricingFormat,
    markup: Option<Decimal>,
    discount: Option<Decimal>,
) -> Result<Decimal, PricingError> {
    let price = raw_price
        .trim()
        .parse::<Decimal>()
        .map_err(|_| PricingError::InvalidPrice {
            value: raw_price.to_string(),
        })?;

    match format {
        PricingFormat::Actual => Ok(price),
        PricingFormat::Base => {
            let (markup, discount) = markup.zip(discount).ok_or(PricingError::MissingBaseInputs)?;
            let factor = Decimal::ONE - discount / Decimal::ONE_HUNDRED;
            Ok((price * markup * factor)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        }
    }
}
