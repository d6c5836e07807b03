//! Client configuration: where the remote store lives.

use std::env;

use crate::error::{Error, Result};

/// Environment variable naming the store's base URL, consulted when no
/// endpoint is passed explicitly.
pub const ENDPOINT_ENV: &str = "KV_STORE_URL";

/// Configuration for a [`StoreClient`](crate::StoreClient).
///
/// Holds the single value the client needs: the base endpoint URL of the
/// remote store, fixed at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base endpoint URL (e.g. "http://localhost:3000")
    pub endpoint: String,
}

impl ClientConfig {
    /// Configuration for an explicitly given endpoint.
    ///
    /// A trailing slash is trimmed so per-key URLs join cleanly.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let endpoint = endpoint.trim_end_matches('/').to_string();
        Self { endpoint }
    }

    /// Read the endpoint from the [`ENDPOINT_ENV`] environment variable.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the variable is unset, so a missing
    /// endpoint fails fast at construction instead of on first request.
    pub fn from_env() -> Result<Self> {
        let endpoint = env::var(ENDPOINT_ENV).map_err(|_| {
            Error::Config(format!(
                "no endpoint given and {} environment variable is not set",
                ENDPOINT_ENV
            ))
        })?;
        Ok(Self::new(endpoint))
    }
}
