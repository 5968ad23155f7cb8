//! Ledger Core - Domain entities, services, and traits.
//!
//! This crate holds the holdings and daily price ledger: models, the
//! repository traits implemented by the `storage-sqlite` crate, the Ledger
//! Store service that validates every call, and the price sync service that
//! keeps the price cache current.

pub mod constants;
pub mod errors;
pub mod holdings;
pub mod ledger;
pub mod price_sync;
pub mod prices;

#[cfg(test)]
mod test_support;

pub use holdings::{Holding, HoldingRepositoryTrait, NewHolding};
pub use ledger::{LedgerService, LedgerServiceTrait, PriceHistory};
pub use price_sync::{PriceSyncService, PriceSyncServiceTrait};
pub use prices::{NewPriceObservation, PriceObservation, PriceRepositoryTrait};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
