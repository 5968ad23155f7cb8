//! Holding domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current position in one instrument.
///
/// One row per symbol; the row is replaced in place on every upsert and no
/// history of earlier states is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    /// Units currently held.
    pub quantity: f64,
    /// Acquisition cost per unit.
    pub cost_basis: f64,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a holding.
///
/// An empty `currency` means "use the ledger's base currency".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHolding {
    pub symbol: String,
    pub quantity: f64,
    pub cost_basis: f64,
    #[serde(default)]
    pub currency: String,
}

impl NewHolding {
    pub fn new(symbol: &str, quantity: f64, cost_basis: f64, currency: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            quantity,
            cost_basis,
            currency: currency.to_string(),
        }
    }
}
