pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::{admin_endpoint, AdminClient};
pub use error::ShopifyError;
pub use types::{UserError, VariantHit};
