use serde::{Deserialize, Serialize};

use crate::prices::PriceObservation;

/// Result of [`ensure_price`](super::PriceSyncServiceTrait::ensure_price).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsuredPrice {
    pub observation: PriceObservation,
    /// `false` when today's cached observation was returned without a
    /// provider call.
    pub fetched_now: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSyncStatus {
    /// Fetched from the provider and recorded.
    Fetched,
    /// Today's price was already cached.
    Cached,
    /// The provider failed; the latest cached observation is reported instead.
    CachedAfterError,
    /// The provider failed and nothing is cached.
    Failed,
}

/// Per-symbol outcome of a refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSyncOutcome {
    pub symbol: String,
    pub status: PriceSyncStatus,
    pub observation: Option<PriceObservation>,
    pub error: Option<String>,
}

/// Summary of a refresh over every holding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSyncSummary {
    pub outcomes: Vec<PriceSyncOutcome>,
}

impl PriceSyncSummary {
    pub fn count(&self, status: PriceSyncStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Symbols whose provider call failed, with or without a cached fallback.
    pub fn errors(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }

    pub fn is_success(&self) -> bool {
        self.errors() == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} symbols: {} fetched, {} cached, {} stale after error, {} failed",
            self.outcomes.len(),
            self.count(PriceSyncStatus::Fetched),
            self.count(PriceSyncStatus::Cached),
            self.count(PriceSyncStatus::CachedAfterError),
            self.count(PriceSyncStatus::Failed),
        )
    }
}
