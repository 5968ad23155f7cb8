use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use std::sync::Arc;

use super::price_sync_model::{EnsuredPrice, PriceSyncOutcome, PriceSyncStatus, PriceSyncSummary};
use crate::errors::Result;
use crate::ledger::{normalize_symbol, LedgerServiceTrait};
use ledger_market_data::PriceProvider;

#[async_trait]
pub trait PriceSyncServiceTrait: Send + Sync {
    /// Return today's price for `symbol`, calling the provider only when
    /// nothing is cached for today or `force_refresh` is set.
    async fn ensure_price(&self, symbol: &str, force_refresh: bool) -> Result<EnsuredPrice>;

    /// Ensure a price for every holding. Never fails as a whole; per-symbol
    /// failures are reported in the summary.
    async fn refresh_all(&self, force_refresh: bool) -> Result<PriceSyncSummary>;
}

pub struct PriceSyncService {
    ledger: Arc<dyn LedgerServiceTrait>,
    provider: Arc<dyn PriceProvider>,
}

impl PriceSyncService {
    /// Live calls are paced by the provider itself, per HTTP request.
    pub fn new(ledger: Arc<dyn LedgerServiceTrait>, provider: Arc<dyn PriceProvider>) -> Self {
        Self { ledger, provider }
    }

    /// [`ensure_price`](PriceSyncServiceTrait::ensure_price) against an
    /// explicit calendar day.
    pub async fn ensure_price_on(
        &self,
        symbol: &str,
        force_refresh: bool,
        today: NaiveDate,
    ) -> Result<EnsuredPrice> {
        let symbol = normalize_symbol(symbol)?;

        if !force_refresh {
            if let Some(cached) = self.ledger.latest_price(&symbol)? {
                if cached.asof == today {
                    debug!("{}: using cached price from {}", symbol, cached.asof);
                    return Ok(EnsuredPrice {
                        observation: cached,
                        fetched_now: false,
                    });
                }
            }
        }

        let quote = self.provider.latest_price(&symbol).await?;
        debug!(
            "{}: {} returned {} as of {}",
            symbol, quote.source, quote.price, quote.asof
        );

        let observation = self
            .ledger
            .record_price(&symbol, quote.price, quote.asof)
            .await?;
        Ok(EnsuredPrice {
            observation,
            fetched_now: true,
        })
    }

    /// [`refresh_all`](PriceSyncServiceTrait::refresh_all) against an
    /// explicit calendar day.
    pub async fn refresh_all_on(
        &self,
        force_refresh: bool,
        today: NaiveDate,
    ) -> Result<PriceSyncSummary> {
        let holdings = self.ledger.list_holdings()?;
        let mut summary = PriceSyncSummary::default();

        for holding in holdings {
            let outcome = match self.ensure_price_on(&holding.symbol, force_refresh, today).await {
                Ok(ensured) => PriceSyncOutcome {
                    symbol: holding.symbol,
                    status: if ensured.fetched_now {
                        PriceSyncStatus::Fetched
                    } else {
                        PriceSyncStatus::Cached
                    },
                    observation: Some(ensured.observation),
                    error: None,
                },
                Err(e) => self.fallback_outcome(holding.symbol, e.to_string()),
            };
            summary.outcomes.push(outcome);
        }

        info!("Price refresh finished: {}", summary.summary());
        Ok(summary)
    }

    fn fallback_outcome(&self, symbol: String, error: String) -> PriceSyncOutcome {
        let cached = match self.ledger.latest_price(&symbol) {
            Ok(cached) => cached,
            Err(e) => {
                warn!("{}: could not read cached price: {}", symbol, e);
                None
            }
        };

        match cached {
            Some(observation) => {
                warn!(
                    "{}: refresh failed ({}), using cached price from {}",
                    symbol, error, observation.asof
                );
                PriceSyncOutcome {
                    symbol,
                    status: PriceSyncStatus::CachedAfterError,
                    observation: Some(observation),
                    error: Some(error),
                }
            }
            None => {
                warn!("{}: refresh failed ({}), no cached price", symbol, error);
                PriceSyncOutcome {
                    symbol,
                    status: PriceSyncStatus::Failed,
                    observation: None,
                    error: Some(error),
                }
            }
        }
    }
}

#[async_trait]
impl PriceSyncServiceTrait for PriceSyncService {
    async fn ensure_price(&self, symbol: &str, force_refresh: bool) -> Result<EnsuredPrice> {
        self.ensure_price_on(symbol, force_refresh, Local::now().date_naive())
            .await
    }

    async fn refresh_all(&self, force_refresh: bool) -> Result<PriceSyncSummary> {
        self.refresh_all_on(force_refresh, Local::now().date_naive())
            .await
    }
}
