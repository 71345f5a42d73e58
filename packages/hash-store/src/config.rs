//! Client configuration.
//!
//! A `StoreConfig` is built once (usually deserialized from the host
//! application's settings) and passed by reference to whichever backend
//! constructor its URL scheme selects.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{StoreError, StoreResult};

/// Default per-command timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Connection settings for a remote hash store.
///
/// The URL scheme picks the backend:
/// - `memory://` - an in-process store
/// - `http://`, `https://` - the JSON hash protocol
/// - `redis://` - the Redis protocol
///
/// # Example
///
/// ```rust
/// use remote_hash_store::StoreConfig;
///
/// let config = StoreConfig::from_json(r#"{"url": "redis://127.0.0.1:6379/2"}"#).unwrap();
/// assert_eq!(config.scheme().unwrap(), "redis");
/// assert_eq!(config.timeout().as_millis(), 5_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Where the store lives.
    pub url: String,

    /// Per-command timeout, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Headers sent with every request (HTTP backends only).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Password for stores that require authentication.
    ///
    /// Overrides any password embedded in the URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("memory://local")
    }
}

impl StoreConfig {
    /// Create a config for `url` with default settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            headers: BTreeMap::new(),
            password: None,
        }
    }

    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        serde_json::from_str(json).map_err(|e| StoreError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Set the per-command timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the password used to authenticate.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// The per-command timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The parsed URL.
    pub fn parsed_url(&self) -> StoreResult<Url> {
        Url::parse(&self.url).map_err(|e| StoreError::InvalidConfig {
            message: format!("{}: {}", self.url, e),
        })
    }

    /// The URL scheme, which selects the backend.
    pub fn scheme(&self) -> StoreResult<String> {
        Ok(self.parsed_url()?.scheme().to_string())
    }
}
