//! Price provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::LatestPrice;

use super::capabilities::RateLimit;

/// Trait for daily price providers.
///
/// Implement this trait to add support for a new price source.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use ledger_market_data::provider::{PriceProvider, RateLimit};
///
/// struct StaticProvider;
///
/// #[async_trait]
/// impl PriceProvider for StaticProvider {
///     fn id(&self) -> &'static str {
///         "STATIC"
///     }
///
///     fn rate_limit(&self) -> RateLimit {
///         RateLimit::default()
///     }
///
///     // ... implement latest_price
/// }
/// ```
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "ALPHA_VANTAGE".
    ///
    /// Used for logging and stored as the price source.
    fn id(&self) -> &'static str;

    /// Rate limits of the provider's API. Implementations pace their own
    /// requests at this rate, including every request of a fallback chain.
    fn rate_limit(&self) -> RateLimit;

    /// Fetch the latest daily price for a symbol.
    ///
    /// # Returns
    ///
    /// The latest price on success, or a `MarketDataError` on failure.
    async fn latest_price(&self, symbol: &str) -> Result<LatestPrice, MarketDataError>;
}
