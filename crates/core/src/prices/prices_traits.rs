//! Repository traits for daily prices.

use async_trait::async_trait;

use crate::errors::Result;
use crate::prices::{NewPriceObservation, PriceObservation};

/// Storage interface for the append-only `prices_daily` table.
///
/// # Ordering
///
/// Several observations may share a (`symbol`, `asof`) pair. Among them the
/// one with the greatest `inserted_at` is authoritative, ties going to the
/// greatest `id`.
#[async_trait]
pub trait PriceRepositoryTrait: Send + Sync {
    /// Append an observation. The store assigns `id` and `inserted_at`.
    async fn record_price(&self, observation: &NewPriceObservation) -> Result<PriceObservation>;

    /// The authoritative observation with the greatest `asof`, if any.
    fn latest_price(&self, symbol: &str) -> Result<Option<PriceObservation>>;

    /// At most `limit` observations, one per `asof` (the authoritative one),
    /// strictly descending by `asof`.
    fn price_history(&self, symbol: &str, limit: usize) -> Result<Vec<PriceObservation>>;

    /// Every stored observation for the symbol, corrections included, ordered
    /// by `asof`, then `inserted_at`, then `id`, all descending.
    fn price_observations(&self, symbol: &str) -> Result<Vec<PriceObservation>>;

    /// The newest `limit` observations across all symbols.
    fn recent_prices(&self, limit: usize) -> Result<Vec<PriceObservation>>;
}
