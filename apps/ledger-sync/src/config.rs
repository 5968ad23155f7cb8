use std::path::Path;

use ledger_core::constants::DEFAULT_CURRENCY;
use ledger_storage_sqlite::get_db_path;

pub struct Config {
    pub db_path: String,
    pub base_currency: String,
    pub alpha_vantage_key: Option<String>,
    pub force_refresh: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Values are trimmed and
    /// empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let data_dir = get("LEDGER_DATA_DIR").unwrap_or_else(|| "./data".into());
        let db_path = get("DATABASE_URL")
            .map(|url| strip_sqlite_scheme(&url).to_string())
            .unwrap_or_else(|| get_db_path(&data_dir));
        let base_currency = get("BASE_CURRENCY")
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.into());
        let force_refresh = get("LEDGER_FORCE_REFRESH")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Self {
            db_path,
            base_currency,
            alpha_vantage_key: get("ALPHAVANTAGE_KEY"),
            force_refresh,
        }
    }

    pub fn data_dir(&self) -> &Path {
        Path::new(&self.db_path)
            .parent()
            .unwrap_or_else(|| Path::new("."))
    }
}

fn strip_sqlite_scheme(url: &str) -> &str {
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url)
}
