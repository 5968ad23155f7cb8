//! Price ingestion: keeps the ledger's price cache current from a provider.

mod price_sync_model;
mod price_sync_service;

#[cfg(test)]
mod price_sync_service_tests;

pub use price_sync_model::*;
pub use price_sync_service::{PriceSyncService, PriceSyncServiceTrait};
