//! HTTP access to the Alpha Vantage query endpoint.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use super::PROVIDER_ID;
use crate::errors::MarketDataError;

pub(crate) const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Raw access to the Alpha Vantage `query` endpoint.
///
/// Returns the response body of one request; interpreting it is left to the
/// provider.
#[async_trait]
pub trait AlphaVantageApi: Send + Sync {
    /// Run `function` for `symbol` and return the body text.
    async fn query(&self, function: &str, symbol: &str) -> Result<String, MarketDataError>;
}

/// [`AlphaVantageApi`] over HTTPS with a 30 s timeout.
pub struct AlphaVantageHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageHttpClient {
    pub fn new(api_key: &str) -> Result<Self, MarketDataError> {
        Self::with_base_url(api_key, BASE_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl AlphaVantageApi for AlphaVantageHttpClient {
    async fn query(&self, function: &str, symbol: &str) -> Result<String, MarketDataError> {
        let params = [
            ("function", function),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
        ];

        let url = reqwest::Url::parse_with_params(&self.base_url, &params).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build URL: {}", e),
            }
        })?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_base_url_is_provider_error() {
        let client = AlphaVantageHttpClient::with_base_url("key", "not a url").unwrap();
        let err = client.query("GLOBAL_QUOTE", "AAPL").await.unwrap_err();
        match err {
            MarketDataError::ProviderError { message, .. } => {
                assert!(message.starts_with("Failed to build URL"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
