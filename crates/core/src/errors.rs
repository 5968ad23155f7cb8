//! Core error types for the ledger.
//!
//! The Ledger Store reports exactly two kinds of failure: the storage could
//! not be reached (transient, retry with backoff) or the input broke a
//! constraint (caller must fix the input). Storage-specific errors (Diesel,
//! SQLite, r2d2) are converted to these variants by the storage layer.

use ledger_market_data::{MarketDataError, RetryClass};
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection or infrastructure failure. Safe to retry with backoff.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Invalid input such as an empty symbol or a non-finite number.
    /// Never retried.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),
}

impl Error {
    /// Whether repeating the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::StorageUnavailable(_) => true,
            Error::ConstraintViolation(_) => false,
            Error::MarketData(e) => e.retry_class() == RetryClass::WithBackoff,
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Error::ConstraintViolation(_))
    }
}
