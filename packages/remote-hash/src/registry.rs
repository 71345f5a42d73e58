//! Backend selection by URL scheme.
//!
//! The registry maps a scheme to the function that builds its client. It is
//! populated once at startup and consulted with a [`StoreConfig`]; there is
//! no global state.

use std::collections::BTreeMap;

use remote_hash_store::{HashStore, InMemoryHashStore, StoreConfig, StoreError, StoreResult};

use crate::{HashResult, RemoteHash};

/// Builds a store client from a config.
pub type Connector = fn(&StoreConfig) -> StoreResult<Box<dyn HashStore>>;

/// Scheme -> connector table.
///
/// # Example
///
/// ```rust
/// use remote_hash::{HashStore, StoreRegistry};
/// use remote_hash_store::StoreConfig;
///
/// let registry = StoreRegistry::with_defaults();
/// let store = registry.connect(&StoreConfig::new("memory://scratch")).unwrap();
/// store.set_field("k", "a", "1").unwrap();
/// ```
#[derive(Clone, Default)]
pub struct StoreRegistry {
    connectors: BTreeMap<String, Connector>,
}

impl StoreRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every backend compiled into this build.
    ///
    /// - `memory` always; each connect yields a fresh, private store
    /// - `http`, `https` with the `http` feature
    /// - `redis` with the `resp` feature
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("memory", connect_memory);

        #[cfg(feature = "http")]
        {
            registry.register("http", connect_http);
            registry.register("https", connect_http);
        }

        #[cfg(feature = "resp")]
        registry.register("redis", connect_resp);

        registry
    }

    /// Register (or replace) the connector for `scheme`.
    pub fn register(&mut self, scheme: impl Into<String>, connector: Connector) -> &mut Self {
        self.connectors.insert(scheme.into(), connector);
        self
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.connectors.keys().map(String::as_str)
    }

    /// Build the client selected by `config.url`'s scheme.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnsupportedScheme`] if no connector is registered for
    /// the scheme, or whatever the connector itself reports.
    pub fn connect(&self, config: &StoreConfig) -> StoreResult<Box<dyn HashStore>> {
        let scheme = config.scheme()?;
        let Some(connector) = self.connectors.get(&scheme) else {
            return Err(StoreError::UnsupportedScheme { scheme });
        };
        log::debug!("connecting {} store", scheme);
        connector(config)
    }

    /// Build a client and bind `namespace_key` to it.
    pub fn open(
        &self,
        config: &StoreConfig,
        namespace_key: impl Into<String>,
    ) -> HashResult<RemoteHash<Box<dyn HashStore>>> {
        let store = self.connect(config)?;
        RemoteHash::new(store, namespace_key)
    }
}

/// Build the client for `config` using the default registry.
pub fn connect(config: &StoreConfig) -> StoreResult<Box<dyn HashStore>> {
    StoreRegistry::with_defaults().connect(config)
}

fn connect_memory(_config: &StoreConfig) -> StoreResult<Box<dyn HashStore>> {
    Ok(Box::new(InMemoryHashStore::new()))
}

#[cfg(feature = "http")]
fn connect_http(config: &StoreConfig) -> StoreResult<Box<dyn HashStore>> {
    Ok(Box::new(remote_hash_http::HttpHashStore::from_config(
        config,
    )?))
}

#[cfg(feature = "resp")]
fn connect_resp(config: &StoreConfig) -> StoreResult<Box<dyn HashStore>> {
    Ok(Box::new(remote_hash_resp::RespHashStore::from_config(
        config,
    )?))
}
