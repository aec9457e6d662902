//! Offer vocabulary shared across the workspace.
//!
//! Offers move through a one-way lifecycle: `pending` (scheduled, nothing
//! pushed remotely) to `active` (offer prices live in the catalog) to
//! `completed` (original prices restored). Transitions are claimed with
//! guarded UPDATEs in the db crate; these types only name the states.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OfferParseError {
    #[error("invalid offer status: {0}")]
    InvalidStatus(String),
    #[error("invalid price type: {0}")]
    InvalidPriceType(String),
    #[error("invalid pricing format: {0}")]
    InvalidPricingFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Active,
    Completed,
}

impl OfferStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Active => "active",
            OfferStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = OfferParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OfferStatus::Pending),
            "active" => Ok(OfferStatus::Active),
            "completed" => Ok(OfferStatus::Completed),
            other => Err(OfferParseError::InvalidStatus(other.to_string())),
        }
    }
}

/// Whether the scheduled price is a temporary offer (reverted when the window
/// closes) or a permanent regular-price change (nothing to restore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    Offer,
    Regular,
}

impl PriceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PriceType::Offer => "offer",
            PriceType::Regular => "regular",
        }
    }
}

impl std::fmt::Display for PriceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceType {
    type Err = OfferParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offer" => Ok(PriceType::Offer),
            "regular" => Ok(PriceType::Regular),
            other => Err(OfferParseError::InvalidPriceType(other.to_string())),
        }
    }
}

/// How the uploaded CSV expresses prices: `actual` rows carry the final price,
/// `base` rows carry a base price the calculator derives the final price from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingFormat {
    Actual,
    Base,
}

impl PricingFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PricingFormat::Actual => "actual",
            PricingFormat::Base => "base",
        }
    }
}

impl std::fmt::Display for PricingFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingFormat {
    type Err = OfferParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "actual" => Ok(PricingFormat::Actual),
            "base" => Ok(PricingFormat::Base),
            other => Err(OfferParseError::InvalidPricingFormat(other.to_string())),
        }
    }
}

/// Split a stored comma-separated tag string into trimmed, non-empty tags.
#[must_use]
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Union of `existing` and `add`, preserving the order of `existing` and
/// appending only tags not already present. Matching is exact-string.
#[must_use]
pub fn merge_tags(existing: &[String], add: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = existing.to_vec();
    for tag in add {
        if !merged.iter().any(|t| t == tag) {
            merged.push(tag.clone());
        }
    }
    merged
}

/// `existing` minus `remove`, preserving order. Matching is exact-string.
#[must_use]
pub fn remove_tags(existing: &[String], remove: &[String]) -> Vec<String> {
    existing
        .iter()
        .filter(|t| !remove.iter().any(|r| r == *t))
        .cloned()
        .collect()
}
