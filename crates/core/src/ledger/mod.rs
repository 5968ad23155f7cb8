//! The Ledger Store: validated access to holdings and daily prices.

mod ledger_service;
mod validation;


pub use ledger_service::{LedgerService, LedgerServiceTrait, PriceHistory};
pub use validation::{normalize_currency, normalize_symbol};
