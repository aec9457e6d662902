use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod csv_items;
pub mod offer;
pub mod pricing;
pub mod samples;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use csv_items::{parse_items, CsvError, CsvItem};
pub use offer::{merge_tags, parse_tag_list, remove_tags, OfferStatus, PriceType, PricingFormat};
pub use pricing::{compute_offer_price, PricingError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
