//! Parser for the uploaded item CSV.
//!
//! The file must carry a header row with a `sku` column and the price column
//! matching the offer's pricing format (`Actual Price` or `Base Price`).
//! Header matching is case-insensitive and whitespace-trimmed; columns the
//! parser does not recognize are ignored, so merchants can upload exports
//! with extra columns untouched.

use thiserror::Error;

use crate::offer::PricingFormat;

/// One data row of the upload: the SKU and the raw price cell.
///
/// The price is kept as the verbatim cell text; the pricing calculator owns
/// decimal parsing so a bad value is reported against the row's SKU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvItem {
    pub sku: String,
    pub price: String,
}

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to parse CSV: {0}")]
    Malformed(#[from] csv::Error),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("line {line}: sku is empty")]
    EmptySku { line: u64 },
}

/// Column header carrying the price for the given pricing format.
#[must_use]
pub fn price_column(format: PricingFormat) -> &'static str {
    match format {
        PricingFormat::Actual => "Actual Price",
        PricingFormat::Base => "Base Price",
    }
}

/// Parse the uploaded CSV text into items for the given pricing format.
///
/// Rows whose cells are all empty are skipped; a row with a price but no SKU
/// is an error so a half-filled row cannot silently drop out of the offer.
///
/// # Errors
///
/// Returns `CsvError` if the text is not parseable CSV, a required column is
/// missing, or a data row has an empty SKU.
pub fn parse_items(text: &str, format: PricingFormat) -> Result<Vec<CsvItem>, CsvError> {
    let wanted = price_column(format);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let sku_idx = find_column(&headers, "sku").ok_or(CsvError::MissingColumn("sku"))?;
    let price_idx = find_column(&headers, wanted).ok_or(CsvError::MissingColumn(wanted))?;

    let mut items = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let sku = record.get(sku_idx).unwrap_or("");
        let price = record.get(price_idx).unwrap_or("");
        if sku.is_empty() {
            let line = record.position().map_or(0, csv::Position::line);
            return Err(CsvError::EmptySku { line });
        }
        items.push(CsvItem {
            sku: sku.to_string(),
            price: price.to_string(),
        });
    }
    Ok(items)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}
