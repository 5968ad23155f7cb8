use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{PriceSyncService, PriceSyncStatus};
use crate::holdings::NewHolding;
use crate::ledger::{LedgerService, LedgerServiceTrait};
use crate::test_support::{MockHoldingRepository, MockPriceRepository};
use ledger_market_data::{LatestPrice, MarketDataError, PriceProvider, RateLimit};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Provider returning canned prices and counting calls.
#[derive(Clone, Default)]
struct MockProvider {
    prices: Arc<Mutex<HashMap<String, LatestPrice>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    fn with_price(self, symbol: &str, price: f64, asof: NaiveDate) -> Self {
        self.prices.lock().unwrap().insert(
            symbol.to_string(),
            LatestPrice::new(symbol, price, asof, "MOCK"),
        );
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceProvider for MockProvider {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    async fn latest_price(&self, symbol: &str) -> Result<LatestPrice, MarketDataError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        self.prices
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))
    }
}

fn setup(provider: MockProvider) -> (PriceSyncService, Arc<LedgerService>, MockPriceRepository) {
    let prices = MockPriceRepository::new();
    let ledger = Arc::new(LedgerService::new(
        Arc::new(MockHoldingRepository::new()),
        Arc::new(prices.clone()),
        "CAD",
    ));
    let service = PriceSyncService::new(ledger.clone(), Arc::new(provider));
    (service, ledger, prices)
}

#[tokio::test]
async fn test_ensure_price_fetches_when_nothing_cached() {
    let today = day(2024, 3, 8);
    let provider = MockProvider::default().with_price("AAPL", 170.7, today);
    let (service, ledger, _) = setup(provider.clone());

    let ensured = service.ensure_price_on("aapl", false, today).await.unwrap();

    assert!(ensured.fetched_now);
    assert_eq!(ensured.observation.symbol, "AAPL");
    assert_eq!(ensured.observation.price, 170.7);
    assert_eq!(provider.calls(), vec!["AAPL"]);
    assert_eq!(ledger.latest_price("AAPL").unwrap().unwrap().asof, today);
}

#[tokio::test]
async fn test_ensure_price_skips_provider_when_today_cached() {
    let today = day(2024, 3, 8);
    let provider = MockProvider::default().with_price("AAPL", 170.7, today);
    let (service, ledger, prices) = setup(provider.clone());
    ledger.record_price("AAPL", 169.0, today).await.unwrap();

    let ensured = service.ensure_price_on("AAPL", false, today).await.unwrap();

    assert!(!ensured.fetched_now);
    assert_eq!(ensured.observation.price, 169.0);
    assert!(provider.calls().is_empty());
    assert_eq!(prices.count(), 1);
}

#[tokio::test]
async fn test_ensure_price_refetches_stale_cache() {
    let today = day(2024, 3, 8);
    let provider = MockProvider::default().with_price("AAPL", 170.7, today);
    let (service, ledger, prices) = setup(provider.clone());
    ledger.record_price("AAPL", 165.0, day(2024, 3, 7)).await.unwrap();

    let ensured = service.ensure_price_on("AAPL", false, today).await.unwrap();

    assert!(ensured.fetched_now);
    assert_eq!(prices.count(), 2);
}

#[tokio::test]
async fn test_force_refresh_appends_new_observation() {
    let today = day(2024, 3, 8);
    let provider = MockProvider::default().with_price("AAPL", 171.2, today);
    let (service, ledger, prices) = setup(provider.clone());
    ledger.record_price("AAPL", 169.0, today).await.unwrap();

    let ensured = service.ensure_price_on("AAPL", true, today).await.unwrap();

    assert!(ensured.fetched_now);
    assert_eq!(prices.count(), 2);
    assert_eq!(ledger.latest_price("AAPL").unwrap().unwrap().price, 171.2);
}

#[tokio::test]
async fn test_ensure_price_propagates_provider_error() {
    let (service, _, prices) = setup(MockProvider::default());

    let err = service
        .ensure_price_on("ZZZZ", false, day(2024, 3, 8))
        .await
        .unwrap_err();

    assert!(!err.is_retryable());
    assert_eq!(prices.count(), 0);
}

#[tokio::test]
async fn test_refresh_all_reports_each_holding() {
    let today = day(2024, 3, 8);
    let provider = MockProvider::default()
        .with_price("AAPL", 170.7, today)
        .with_price("MSFT", 410.0, today);
    let (service, ledger, _) = setup(provider.clone());

    for symbol in ["AAPL", "MSFT", "SHOP", "XEQT"] {
        ledger
            .upsert_holding(NewHolding::new(symbol, 1.0, 10.0, "USD"))
            .await
            .unwrap();
    }
    // SHOP has an older cached price, XEQT has nothing.
    ledger.record_price("SHOP", 95.0, day(2024, 3, 1)).await.unwrap();

    let summary = service.refresh_all_on(false, today).await.unwrap();

    assert_eq!(summary.outcomes.len(), 4);
    assert_eq!(summary.count(PriceSyncStatus::Fetched), 2);
    assert_eq!(summary.count(PriceSyncStatus::CachedAfterError), 1);
    assert_eq!(summary.count(PriceSyncStatus::Failed), 1);
    assert_eq!(summary.errors(), 2);
    assert!(!summary.is_success());

    let shop = summary
        .outcomes
        .iter()
        .find(|o| o.symbol == "SHOP")
        .unwrap();
    assert_eq!(shop.observation.as_ref().unwrap().price, 95.0);
    assert!(shop.error.is_some());

    let xeqt = summary
        .outcomes
        .iter()
        .find(|o| o.symbol == "XEQT")
        .unwrap();
    assert!(xeqt.observation.is_none());
}

#[tokio::test]
async fn test_refresh_all_uses_cache_for_today() {
    let today = day(2024, 3, 8);
    let provider = MockProvider::default().with_price("AAPL", 170.7, today);
    let (service, ledger, _) = setup(provider.clone());
    ledger
        .upsert_holding(NewHolding::new("AAPL", 1.0, 10.0, "USD"))
        .await
        .unwrap();

    let first = service.refresh_all_on(false, today).await.unwrap();
    let second = service.refresh_all_on(false, today).await.unwrap();

    assert_eq!(first.count(PriceSyncStatus::Fetched), 1);
    assert_eq!(second.count(PriceSyncStatus::Cached), 1);
    assert!(second.is_success());
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn test_refresh_all_with_no_holdings_is_empty() {
    let (service, _, _) = setup(MockProvider::default());
    let summary = service.refresh_all_on(false, day(2024, 3, 8)).await.unwrap();
    assert!(summary.outcomes.is_empty());
    assert!(summary.is_success());
}
