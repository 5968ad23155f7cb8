//! Repository traits for holdings.

use async_trait::async_trait;

use crate::errors::Result;
use crate::holdings::{Holding, NewHolding};

/// Storage interface for the `holdings` table.
///
/// Implementations receive symbols and currencies already normalized by the
/// Ledger Store.
#[async_trait]
pub trait HoldingRepositoryTrait: Send + Sync {
    /// Insert the holding, or replace quantity, cost basis and currency of the
    /// existing row with the same symbol. Refreshes `updated_at`.
    async fn upsert_holding(&self, holding: &NewHolding) -> Result<Holding>;

    fn get_holding(&self, symbol: &str) -> Result<Option<Holding>>;

    /// All holdings ordered by symbol.
    fn list_holdings(&self) -> Result<Vec<Holding>>;

    /// Remove a holding. Returns `false` when no row had that symbol.
    async fn delete_holding(&self, symbol: &str) -> Result<bool>;
}
