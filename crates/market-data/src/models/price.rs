use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The most recent daily price a provider reports for a symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestPrice {
    /// Symbol as sent to the provider
    pub symbol: String,

    /// Last traded or closing price
    pub price: f64,

    /// Trading day the price belongs to
    pub asof: NaiveDate,

    /// Provider that produced the price (e.g. "ALPHA_VANTAGE")
    pub source: String,
}

impl LatestPrice {
    pub fn new(symbol: impl Into<String>, price: f64, asof: NaiveDate, source: &str) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            asof,
            source: source.to_string(),
        }
    }
}
