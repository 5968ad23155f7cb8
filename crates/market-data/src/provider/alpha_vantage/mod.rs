//! Alpha Vantage price provider implementation.
//!
//! The latest price is looked up with a chain of endpoints so the free plan
//! keeps working when an endpoint is premium-only or temporarily refused:
//!
//! 1. `GLOBAL_QUOTE` (free, latest price)
//! 2. `TIME_SERIES_DAILY` (often free)
//! 3. `TIME_SERIES_DAILY_ADJUSTED` (may be premium)
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute. Every
//! request in the chain takes a token from the provider's rate limiter, and a
//! rate-limited reply ends the chain since all endpoints share the quota.

mod client;

pub use client::{AlphaVantageApi, AlphaVantageHttpClient};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::errors::MarketDataError;
use crate::models::LatestPrice;
use crate::provider::{PriceProvider, RateLimit};
use crate::rate_limiter::RateLimiter;

const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// Alpha Vantage price provider.
pub struct AlphaVantageProvider {
    api: Arc<dyn AlphaVantageApi>,
    api_key: String,
    limiter: Arc<RateLimiter>,
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// GLOBAL_QUOTE response
#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<HashMap<String, String>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

/// TIME_SERIES_DAILY and TIME_SERIES_DAILY_ADJUSTED response.
///
/// Keys of the series are `YYYY-MM-DD`, so the last entry of the ordered map
/// is the most recent trading day.
#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, HashMap<String, String>>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

/// Endpoints tried, in order, when looking up the latest price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Endpoint {
    GlobalQuote,
    TimeSeriesDaily,
    TimeSeriesDailyAdjusted,
}

impl Endpoint {
    const FALLBACK_CHAIN: [Endpoint; 3] = [
        Endpoint::GlobalQuote,
        Endpoint::TimeSeriesDaily,
        Endpoint::TimeSeriesDailyAdjusted,
    ];

    fn function(&self) -> &'static str {
        match self {
            Endpoint::GlobalQuote => "GLOBAL_QUOTE",
            Endpoint::TimeSeriesDaily => "TIME_SERIES_DAILY",
            Endpoint::TimeSeriesDailyAdjusted => "TIME_SERIES_DAILY_ADJUSTED",
        }
    }
}

// ============================================================================
// AlphaVantageProvider implementation
// ============================================================================

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key, paced at
    /// the free plan's rate.
    ///
    /// An empty key is accepted here; `latest_price` reports it as
    /// `MissingApiKey` without touching the network.
    pub fn new(api_key: String) -> Result<Self, MarketDataError> {
        let api_key = api_key.trim().to_string();
        let api = Arc::new(AlphaVantageHttpClient::new(&api_key)?);
        let limiter = Arc::new(RateLimiter::new(&Self::free_plan()));
        Ok(Self::with_api(api_key, api, limiter))
    }

    /// Build a provider on top of an existing API client and limiter.
    pub fn with_api(
        api_key: String,
        api: Arc<dyn AlphaVantageApi>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            api,
            api_key: api_key.trim().to_string(),
            limiter,
        }
    }

    fn free_plan() -> RateLimit {
        // 5 requests per minute, no bursting.
        RateLimit {
            requests_per_minute: 5,
            burst_capacity: 1.0,
        }
    }

    /// Check for API-level errors in the response.
    ///
    /// `Information` carries premium-only or plan limitation messages, `Note`
    /// is sent when the call frequency is exceeded.
    fn check_api_error(
        information: &Option<String>,
        note: &Option<String>,
        error_message: &Option<String>,
    ) -> Result<(), MarketDataError> {
        if let Some(ref msg) = information {
            if msg.contains("API call frequency") || msg.contains("rate limit") {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("API info: {}", msg),
            });
        }

        if let Some(ref msg) = note {
            warn!("Alpha Vantage note: {}", msg);
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if let Some(ref msg) = error_message {
            if msg.contains("Invalid API call") || msg.contains("not found") {
                return Err(MarketDataError::SymbolNotFound(msg.clone()));
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("API error: {}", msg),
            });
        }

        Ok(())
    }

    fn parse_date(date_str: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").ok()
    }

    fn parse_price(s: &str) -> Option<f64> {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
    }

    fn parse_body<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, MarketDataError> {
        serde_json::from_str(body).map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse response: {}", e),
        })
    }

    /// Parse a GLOBAL_QUOTE body.
    ///
    /// When the payload has no latest trading day, `today` is used.
    fn parse_global_quote(
        symbol: &str,
        body: &str,
        today: NaiveDate,
    ) -> Result<LatestPrice, MarketDataError> {
        let response: GlobalQuoteResponse = Self::parse_body(body)?;

        Self::check_api_error(
            &response.information,
            &response.note,
            &response.error_message,
        )?;

        let quote = response.global_quote.unwrap_or_default();

        let price = quote
            .get("05. price")
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("GLOBAL_QUOTE returned no price for {}", symbol),
            })?;
        let price = Self::parse_price(price).ok_or_else(|| MarketDataError::ValidationFailed {
            message: format!("Invalid price '{}' for {}", price, symbol),
        })?;

        let asof = quote
            .get("07. latest trading day")
            .or_else(|| quote.get("10. latest trading day"))
            .and_then(|d| Self::parse_date(d))
            .unwrap_or_else(|| {
                warn!(
                    "Alpha Vantage: no latest trading day for {}, using {}",
                    symbol, today
                );
                today
            });

        Ok(LatestPrice::new(symbol, price, asof, PROVIDER_ID))
    }

    /// Parse a TIME_SERIES_DAILY(_ADJUSTED) body and keep the latest day.
    fn parse_daily_series(
        symbol: &str,
        body: &str,
        adjusted: bool,
    ) -> Result<LatestPrice, MarketDataError> {
        let response: TimeSeriesResponse = Self::parse_body(body)?;

        Self::check_api_error(
            &response.information,
            &response.note,
            &response.error_message,
        )?;

        let series = response
            .time_series
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                MarketDataError::SymbolNotFound(format!(
                    "No time series returned for symbol: {}",
                    symbol
                ))
            })?;

        let (date_str, row) = series
            .iter()
            .filter(|(date, _)| Self::parse_date(date).is_some())
            .next_back()
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("No dated rows in time series for {}", symbol),
            })?;

        let close = if adjusted {
            row.get("5. adjusted close").or_else(|| row.get("4. close"))
        } else {
            row.get("4. close")
        };

        let price = close
            .and_then(|c| Self::parse_price(c))
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("No close price on {} for {}", date_str, symbol),
            })?;

        // Filtered above, the date parses.
        let asof = Self::parse_date(date_str).ok_or_else(|| MarketDataError::ValidationFailed {
            message: format!("Invalid date '{}' for {}", date_str, symbol),
        })?;

        Ok(LatestPrice::new(symbol, price, asof, PROVIDER_ID))
    }

    async fn fetch_from(
        &self,
        endpoint: Endpoint,
        symbol: &str,
    ) -> Result<LatestPrice, MarketDataError> {
        self.limiter.acquire().await;
        let body = self.api.query(endpoint.function(), symbol).await?;

        match endpoint {
            Endpoint::GlobalQuote => {
                Self::parse_global_quote(symbol, &body, Utc::now().date_naive())
            }
            Endpoint::TimeSeriesDaily => Self::parse_daily_series(symbol, &body, false),
            Endpoint::TimeSeriesDailyAdjusted => Self::parse_daily_series(symbol, &body, true),
        }
    }
}

#[async_trait]
impl PriceProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        Self::free_plan()
    }

    async fn latest_price(&self, symbol: &str) -> Result<LatestPrice, MarketDataError> {
        if self.api_key.is_empty() {
            return Err(MarketDataError::MissingApiKey {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let last = Endpoint::FALLBACK_CHAIN.len() - 1;
        for (idx, endpoint) in Endpoint::FALLBACK_CHAIN.iter().enumerate() {
            match self.fetch_from(*endpoint, symbol).await {
                Ok(price) => {
                    debug!(
                        "Alpha Vantage: {} = {} as of {} via {}",
                        symbol,
                        price.price,
                        price.asof,
                        endpoint.function()
                    );
                    return Ok(price);
                }
                Err(e @ MarketDataError::RateLimited { .. }) => {
                    warn!(
                        "Alpha Vantage: {} rate limited for {}, not trying further endpoints",
                        endpoint.function(),
                        symbol
                    );
                    return Err(e);
                }
                Err(e) if idx < last => {
                    debug!(
                        "Alpha Vantage: {} failed for {}: {}, trying next endpoint",
                        endpoint.function(),
                        symbol,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: "No endpoint available".to_string(),
        })
    }
}
