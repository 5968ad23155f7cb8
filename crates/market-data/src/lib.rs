//! Ledger Market Data Crate
//!
//! Fetches the latest daily price of a symbol so it can be recorded in the
//! ledger's `prices_daily` table.
//!
//! # Core Types
//!
//! - [`PriceProvider`] - Trait implemented by every price source
//! - [`AlphaVantageProvider`] - Alpha Vantage implementation with endpoint fallbacks
//! - [`LatestPrice`] - A price together with the trading day it belongs to
//! - [`RateLimiter`] - Token bucket a provider uses to pace its HTTP requests

pub mod errors;
pub mod models;
pub mod provider;
pub mod rate_limiter;

pub use errors::{MarketDataError, RetryClass};
pub use models::LatestPrice;
pub use provider::alpha_vantage::{AlphaVantageApi, AlphaVantageHttpClient, AlphaVantageProvider};
pub use provider::{PriceProvider, RateLimit};
pub use rate_limiter::RateLimiter;
