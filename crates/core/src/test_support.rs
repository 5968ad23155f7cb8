//! In-memory repositories shared by the service tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::errors::{Error, Result};
use crate::holdings::{Holding, HoldingRepositoryTrait, NewHolding};
use crate::prices::{NewPriceObservation, PriceObservation, PriceRepositoryTrait};

fn unavailable() -> Error {
    Error::StorageUnavailable("Intentional storage failure".to_string())
}

#[derive(Clone, Default)]
pub struct MockHoldingRepository {
    holdings: Arc<Mutex<BTreeMap<String, Holding>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockHoldingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    fn check(&self) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl HoldingRepositoryTrait for MockHoldingRepository {
    async fn upsert_holding(&self, holding: &NewHolding) -> Result<Holding> {
        self.check()?;
        let saved = Holding {
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            cost_basis: holding.cost_basis,
            currency: holding.currency.clone(),
            updated_at: Utc::now(),
        };
        self.holdings
            .lock()
            .unwrap()
            .insert(saved.symbol.clone(), saved.clone());
        Ok(saved)
    }

    fn get_holding(&self, symbol: &str) -> Result<Option<Holding>> {
        self.check()?;
        Ok(self.holdings.lock().unwrap().get(symbol).cloned())
    }

    fn list_holdings(&self) -> Result<Vec<Holding>> {
        self.check()?;
        Ok(self.holdings.lock().unwrap().values().cloned().collect())
    }

    async fn delete_holding(&self, symbol: &str) -> Result<bool> {
        self.check()?;
        Ok(self.holdings.lock().unwrap().remove(symbol).is_some())
    }
}

#[derive(Clone, Default)]
pub struct MockPriceRepository {
    observations: Arc<Mutex<Vec<PriceObservation>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockPriceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn count(&self) -> usize {
        self.observations.lock().unwrap().len()
    }

    fn check(&self) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(unavailable());
        }
        Ok(())
    }

    fn sorted_for(&self, symbol: Option<&str>) -> Vec<PriceObservation> {
        let mut rows: Vec<PriceObservation> = self
            .observations
            .lock()
            .unwrap()
            .iter()
            .filter(|o| symbol.map_or(true, |s| o.symbol == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.authority_cmp(a));
        rows
    }
}

#[async_trait]
impl PriceRepositoryTrait for MockPriceRepository {
    async fn record_price(&self, observation: &NewPriceObservation) -> Result<PriceObservation> {
        self.check()?;
        let mut rows = self.observations.lock().unwrap();
        let id = rows.len() as i64 + 1;
        // Strictly increasing insert times, even within one clock tick.
        let recorded = PriceObservation {
            id,
            symbol: observation.symbol.clone(),
            price: observation.price,
            asof: observation.asof,
            inserted_at: Utc::now() + Duration::microseconds(id),
        };
        rows.push(recorded.clone());
        Ok(recorded)
    }

    fn latest_price(&self, symbol: &str) -> Result<Option<PriceObservation>> {
        self.check()?;
        Ok(self.sorted_for(Some(symbol)).into_iter().next())
    }

    fn price_history(&self, symbol: &str, limit: usize) -> Result<Vec<PriceObservation>> {
        self.check()?;
        let mut seen = HashSet::new();
        Ok(self
            .sorted_for(Some(symbol))
            .into_iter()
            .filter(|o| seen.insert(o.asof))
            .take(limit)
            .collect())
    }

    fn price_observations(&self, symbol: &str) -> Result<Vec<PriceObservation>> {
        self.check()?;
        Ok(self.sorted_for(Some(symbol)))
    }

    fn recent_prices(&self, limit: usize) -> Result<Vec<PriceObservation>> {
        self.check()?;
        Ok(self.sorted_for(None).into_iter().take(limit).collect())
    }
}
