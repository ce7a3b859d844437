//! Configuration for connecting to ServiceDesk Plus.
//!
//! The client takes an explicit [`Config`]; nothing in the library reads
//! the process environment. [`Config::from_env`] exists for binaries that
//! want the conventional `SDP_BASE_URL` / `SDP_API_KEY` variables.

use std::env;
use std::fmt;

use crate::error::SdpError;

/// Credential and endpoint for one ServiceDesk Plus instance.
///
/// The API key is never logged; the `Debug` output redacts it.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the SDP instance (e.g., `http://sdplus/sdpapi`).
    pub base_url: String,

    /// Technician key sent as `TECHNICIAN_KEY`.
    api_key: String,
}

impl Config {
    /// Builds a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns `SdpError::Config` if the base URL has no http(s) scheme or
    /// the key is empty or a placeholder.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, SdpError> {
        let base_url = Self::validate_base_url(base_url.into())?;
        let api_key = api_key.into().trim().to_string();
        Self::validate_api_key(&api_key)?;

        Ok(Config { base_url, api_key })
    }

    /// Loads configuration from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `SDP_BASE_URL`: The base URL of the ServiceDesk Plus instance
    /// - `SDP_API_KEY`: The technician API key for authentication
    ///
    /// # Example
    ///
    /// ```ignore
    /// dotenvy::dotenv().ok();
    /// let config = Config::from_env()?;
    /// ```
    pub fn from_env() -> Result<Self, SdpError> {
        let base_url = Self::get_required_env("SDP_BASE_URL")?;
        let api_key = Self::get_required_env("SDP_API_KEY")?;

        Self::new(base_url, api_key)
    }

    /// Returns the technician key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, SdpError> {
        env::var(name)
            .map_err(|_| SdpError::missing_env(name))
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(SdpError::missing_env(name))
                } else {
                    Ok(value)
                }
            })
    }

    /// Validates and normalizes the base URL.
    fn validate_base_url(url: String) -> Result<String, SdpError> {
        let url = url.trim().trim_end_matches('/').to_string();

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SdpError::invalid_config(
                "base URL must start with http:// or https://",
            ));
        }

        Ok(url)
    }

    /// Validates the API key is present and not a placeholder value.
    fn validate_api_key(key: &str) -> Result<(), SdpError> {
        if key.is_empty() {
            return Err(SdpError::invalid_config("API key must not be empty"));
        }

        let key_lower = key.to_lowercase();
        let placeholder_patterns = [
            "your_api_key",
            "your_key",
            "placeholder",
            "xxx",
            "changeme",
        ];

        for pattern in placeholder_patterns {
            if key_lower.contains(pattern) {
                return Err(SdpError::invalid_config(
                    "API key appears to be a placeholder value",
                ));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
