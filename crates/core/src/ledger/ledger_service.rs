use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use std::sync::Arc;

use super::validation::{ensure_finite, ensure_price, normalize_currency, normalize_symbol};
use crate::constants::DEFAULT_CURRENCY;
use crate::errors::Result;
use crate::holdings::{Holding, HoldingRepositoryTrait, NewHolding};
use crate::prices::{NewPriceObservation, PriceObservation, PriceRepositoryTrait};

/// Bounded price history, newest `asof` first.
pub type PriceHistory = std::vec::IntoIter<PriceObservation>;

/// Persistence and retrieval of holdings and price observations.
///
/// Every operation normalizes its symbol (trimmed, upper-case) and rejects
/// invalid input with `Error::ConstraintViolation` before reaching storage.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    /// Create the holding, or replace its quantity, cost basis and currency.
    async fn upsert_holding(&self, holding: NewHolding) -> Result<Holding>;

    fn get_holding(&self, symbol: &str) -> Result<Option<Holding>>;

    fn list_holdings(&self) -> Result<Vec<Holding>>;

    /// Remove a holding. Price observations for the symbol are kept.
    async fn delete_holding(&self, symbol: &str) -> Result<bool>;

    /// Append a price observation for `symbol` as of `asof`.
    async fn record_price(&self, symbol: &str, price: f64, asof: NaiveDate)
        -> Result<PriceObservation>;

    fn latest_price(&self, symbol: &str) -> Result<Option<PriceObservation>>;

    fn price_history(&self, symbol: &str, limit: usize) -> Result<PriceHistory>;

    fn price_observations(&self, symbol: &str) -> Result<Vec<PriceObservation>>;

    fn recent_prices(&self, limit: usize) -> Result<Vec<PriceObservation>>;

    /// Currency used for holdings recorded without one.
    fn base_currency(&self) -> &str;
}

pub struct LedgerService {
    holding_repository: Arc<dyn HoldingRepositoryTrait>,
    price_repository: Arc<dyn PriceRepositoryTrait>,
    base_currency: String,
}

impl LedgerService {
    pub fn new(
        holding_repository: Arc<dyn HoldingRepositoryTrait>,
        price_repository: Arc<dyn PriceRepositoryTrait>,
        base_currency: &str,
    ) -> Self {
        LedgerService {
            holding_repository,
            price_repository,
            base_currency: normalize_currency(base_currency, DEFAULT_CURRENCY),
        }
    }
}

#[async_trait]
impl LedgerServiceTrait for LedgerService {
    async fn upsert_holding(&self, holding: NewHolding) -> Result<Holding> {
        let normalized = NewHolding {
            symbol: normalize_symbol(&holding.symbol)?,
            quantity: ensure_finite("quantity", holding.quantity)?,
            cost_basis: ensure_finite("cost_basis", holding.cost_basis)?,
            currency: normalize_currency(&holding.currency, &self.base_currency),
        };

        let saved = self
            .holding_repository
            .upsert_holding(&normalized)
            .await?;
        info!(
            "Upserted holding {}: quantity={} cost_basis={} {}",
            saved.symbol, saved.quantity, saved.cost_basis, saved.currency
        );
        Ok(saved)
    }

    fn get_holding(&self, symbol: &str) -> Result<Option<Holding>> {
        let symbol = normalize_symbol(symbol)?;
        self.holding_repository.get_holding(&symbol)
    }

    fn list_holdings(&self) -> Result<Vec<Holding>> {
        self.holding_repository.list_holdings()
    }

    async fn delete_holding(&self, symbol: &str) -> Result<bool> {
        let symbol = normalize_symbol(symbol)?;
        let deleted = self.holding_repository.delete_holding(&symbol).await?;
        if deleted {
            info!("Deleted holding {}", symbol);
        } else {
            debug!("No holding {} to delete", symbol);
        }
        Ok(deleted)
    }

    async fn record_price(
        &self,
        symbol: &str,
        price: f64,
        asof: NaiveDate,
    ) -> Result<PriceObservation> {
        let observation = NewPriceObservation {
            symbol: normalize_symbol(symbol)?,
            price: ensure_price(price)?,
            asof,
        };

        let recorded = self.price_repository.record_price(&observation).await?;
        debug!(
            "Recorded price #{} {} = {} as of {}",
            recorded.id, recorded.symbol, recorded.price, recorded.asof
        );
        Ok(recorded)
    }

    fn latest_price(&self, symbol: &str) -> Result<Option<PriceObservation>> {
        let symbol = normalize_symbol(symbol)?;
        self.price_repository.latest_price(&symbol)
    }

    fn price_history(&self, symbol: &str, limit: usize) -> Result<PriceHistory> {
        let symbol = normalize_symbol(symbol)?;
        if limit == 0 {
            return Ok(Vec::new().into_iter());
        }
        let history = self.price_repository.price_history(&symbol, limit)?;
        Ok(history.into_iter())
    }

    fn price_observations(&self, symbol: &str) -> Result<Vec<PriceObservation>> {
        let symbol = normalize_symbol(symbol)?;
        self.price_repository.price_observations(&symbol)
    }

    fn recent_prices(&self, limit: usize) -> Result<Vec<PriceObservation>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.price_repository.recent_prices(limit)
    }

    fn base_currency(&self) -> &str {
        &self.base_currency
    }
}
