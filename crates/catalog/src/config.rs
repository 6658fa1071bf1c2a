//! Catalog lookup configuration.

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`CatalogConfig::current_date_resolution_ms`].
pub const CURRENT_DATE_RESOLUTION_ENV: &str = "CARTLEDGER_CURRENT_DATE_RESOLUTION_MS";

pub const DEFAULT_CURRENT_DATE_RESOLUTION_MS: u64 = 10_000;

fn default_current_date_resolution_ms() -> u64 {
    DEFAULT_CURRENT_DATE_RESOLUTION_MS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// How long the cached "current time" is reused by active-category
    /// queries, in milliseconds.
    #[serde(default = "default_current_date_resolution_ms")]
    pub current_date_resolution_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            current_date_resolution_ms: DEFAULT_CURRENT_DATE_RESOLUTION_MS,
        }
    }
}

impl CatalogConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let current_date_resolution_ms = match std::env::var(CURRENT_DATE_RESOLUTION_ENV) {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    value = %raw,
                    "{CURRENT_DATE_RESOLUTION_ENV} invalid; using default"
                );
                DEFAULT_CURRENT_DATE_RESOLUTION_MS
            }),
            Err(_) => DEFAULT_CURRENT_DATE_RESOLUTION_MS,
        };

        Self {
            current_date_resolution_ms,
        }
    }
}
