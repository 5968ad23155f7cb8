use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use ledger_core::ledger::{LedgerService, LedgerServiceTrait};
use ledger_core::price_sync::{PriceSyncService, PriceSyncServiceTrait, PriceSyncStatus, PriceSyncSummary};
use ledger_market_data::AlphaVantageProvider;
use ledger_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, HoldingRepository, PriceRepository,
};

use crate::config::Config;

pub struct AppState {
    pub ledger: Arc<dyn LedgerServiceTrait>,
    pub price_sync: Arc<dyn PriceSyncServiceTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("LEDGER_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let api_key = config
        .alpha_vantage_key
        .clone()
        .context("ALPHAVANTAGE_KEY is not set")?;

    let db_path = init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    tracing::debug!("Data directory: {}", config.data_dir().display());

    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let holding_repository = Arc::new(HoldingRepository::new(pool.clone(), writer.clone()));
    let price_repository = Arc::new(PriceRepository::new(pool.clone(), writer));

    let ledger: Arc<dyn LedgerServiceTrait> = Arc::new(LedgerService::new(
        holding_repository,
        price_repository,
        &config.base_currency,
    ));
    let provider = Arc::new(AlphaVantageProvider::new(api_key)?);
    let price_sync: Arc<dyn PriceSyncServiceTrait> =
        Arc::new(PriceSyncService::new(ledger.clone(), provider));

    Ok(AppState { ledger, price_sync })
}

/// Refresh every holding and log one line per symbol plus a summary.
pub async fn run_sync(state: &AppState, force_refresh: bool) -> anyhow::Result<PriceSyncSummary> {
    tracing::info!(
        "Refreshing prices (base currency {}, force_refresh={})",
        state.ledger.base_currency(),
        force_refresh
    );

    let summary = state.price_sync.refresh_all(force_refresh).await?;
    tracing::info!("Refreshed {} holdings", summary.outcomes.len());
    for outcome in &summary.outcomes {
        let price = outcome
            .observation
            .as_ref()
            .map(|o| format!("{} as of {}", o.price, o.asof))
            .unwrap_or_else(|| "no price".to_string());
        match outcome.status {
            PriceSyncStatus::Fetched | PriceSyncStatus::Cached => {
                tracing::info!("{:<10} {:?}: {}", outcome.symbol, outcome.status, price)
            }
            PriceSyncStatus::CachedAfterError | PriceSyncStatus::Failed => tracing::warn!(
                "{:<10} {:?}: {} ({})",
                outcome.symbol,
                outcome.status,
                price,
                outcome.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    tracing::info!("{}", summary.summary());
    Ok(summary)
}
