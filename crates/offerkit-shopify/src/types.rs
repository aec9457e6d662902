//! Shopify Admin GraphQL response types.
//!
//! ## Observed shape notes
//!
//! ### Prices
//! The Admin API returns variant prices as **decimal strings** (`"24.99"`),
//! never JSON numbers. We pass them through as strings; callers that need
//! arithmetic parse them into `rust_decimal::Decimal` and treat a parse
//! failure as a per-item error.
//!
//! ### IDs
//! All ids are GraphQL global ids, e.g.
//! `gid://shopify/ProductVariant/1234567890`. They are opaque to us: captured
//! from lookups and echoed back into mutations unchanged.
//!
//! ### `userErrors`
//! Mutations report field-level validation problems in a `userErrors` array
//! while still responding 200 with top-level `data`. An empty array means the
//! mutation took effect. These are distinct from top-level `errors`, which
//! indicate the whole document was rejected.
//!
//! ### Tags
//! `Product.tags` is a JSON array of strings. `productUpdate` replaces the
//! whole array, so tag edits must send the full merged list.

use serde::Deserialize;

/// Top-level GraphQL response envelope.
///
/// `data` is absent (or null) when the document fails validation; `errors`
/// is absent on clean responses, hence the default.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

/// One variant matched by a SKU lookup, flattened for callers.
#[derive(Debug, Clone)]
pub struct VariantHit {
    /// Variant global id, used for price mutations.
    pub variant_id: String,
    /// Owning product's global id, used for price and tag mutations.
    pub product_id: String,
    /// Current catalog price as a decimal string.
    pub price: String,
    /// Current tags on the owning product.
    pub tags: Vec<String>,
}

/// A field-level mutation error reported by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Wire shapes for each operation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VariantLookupData {
    pub product_variants: VariantConnection,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariantConnection {
    pub edges: Vec<VariantEdge>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariantEdge {
    pub node: VariantNode,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariantNode {
    pub id: String,
    pub price: String,
    pub product: ProductRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductRef {
    pub id: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VariantPriceUpdateData {
    pub product_variants_bulk_update: Option<MutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductUpdateData {
    pub product_update: Option<MutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MutationPayload {
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}
