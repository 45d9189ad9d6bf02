//! Store connection settings loaded via OrthoConfig.
//!
//! Values come from `DISCOVERY_*` environment variables, configuration files
//! and command-line flags, merged by `ortho_config`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Errors raised when settings cannot be turned into a usable connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// No store URL was configured.
    #[error("store URL is not configured (set DISCOVERY_STORE_URL)")]
    MissingStoreUrl,
    /// The configured store URL did not parse.
    #[error("store URL {value:?} is invalid: {reason}")]
    InvalidStoreUrl {
        /// Configured value.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// Configuration for the remote listing and favorites stores.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DISCOVERY")]
pub struct DiscoverySettings {
    /// REST root of the PostgREST endpoint.
    pub store_url: Option<String>,
    /// Anonymous API key sent as `apikey` and bearer token.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Emit logs as JSON lines.
    #[ortho_config(default = false)]
    pub json_logs: bool,
}

impl DiscoverySettings {
    /// Parsed store URL.
    ///
    /// # Errors
    ///
    /// Fails when the URL is missing or does not parse.
    pub fn store_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .store_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(SettingsError::MissingStoreUrl)?;
        Url::parse(raw).map_err(|error| SettingsError::InvalidStoreUrl {
            value: raw.to_owned(),
            reason: error.to_string(),
        })
    }

    /// API key, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Request timeout, defaulting to ten seconds and never below one.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
                .max(1),
        )
    }
}
