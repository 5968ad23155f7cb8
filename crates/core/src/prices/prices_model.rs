//! Price observation domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One recorded price for one symbol as of one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceObservation {
    /// Surrogate id, increasing with every insert.
    pub id: i64,
    pub symbol: String,
    pub price: f64,
    /// Day the price applies to.
    pub asof: NaiveDate,
    /// When the row was written.
    pub inserted_at: DateTime<Utc>,
}

impl PriceObservation {
    /// Orders observations of one symbol from least to most authoritative:
    /// by `asof`, then `inserted_at`, then `id`.
    pub fn authority_cmp(&self, other: &Self) -> Ordering {
        self.asof
            .cmp(&other.asof)
            .then_with(|| self.inserted_at.cmp(&other.inserted_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Input for appending a price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPriceObservation {
    pub symbol: String,
    pub price: f64,
    pub asof: NaiveDate,
}

impl NewPriceObservation {
    pub fn new(symbol: &str, price: f64, asof: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_string(),
            price,
            asof,
        }
    }
}
