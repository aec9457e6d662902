//! Downloadable CSV templates for each pricing format.

use crate::offer::PricingFormat;

pub const SAMPLE_ACTUAL_CSV: &str = "\
sku,Actual Price
SHIRT-RED-S,19.99
SHIRT-RED-M,19.99
MUG-CLASSIC,12.49
";

pub const SAMPLE_BASE_CSV: &str = "\
sku,Base Price
SHIRT-RED-S,12.50
SHIRT-RED-M,12.50
MUG-CLASSIC,8.00
";

/// Sample upload matching the given pricing format's required columns.
#[must_use]
pub fn sample_csv(format: PricingFormat) -> &'static str {
    match format {
        PricingFormat::Actual => SAMPLE_ACTUAL_CSV,
        PricingFormat::Base => SAMPLE_BASE_CSV,
    }
}
