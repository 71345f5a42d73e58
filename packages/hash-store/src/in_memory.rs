//! In-process hash store.
//!
//! Holds every namespace key in one map behind a lock. Each trait method
//! takes the lock once, so every command is atomic exactly as the remote
//! contract requires.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{HashStore, Mapping, StoreResult};

/// An in-memory [`HashStore`].
///
/// Useful for tests and for single-process deployments that still want the
/// remote-hash interface.
///
/// # Example
///
/// ```rust
/// use remote_hash_store::{HashStore, InMemoryHashStore};
///
/// let store = InMemoryHashStore::new();
/// store.set_field("user:1", "name", "Alice").unwrap();
///
/// assert_eq!(store.get_field("user:1", "name").unwrap(), Some("Alice".to_string()));
/// assert!(store.get_all("user:2").unwrap().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryHashStore {
    hashes: RwLock<HashMap<String, Mapping>>,
}

impl InMemoryHashStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with initial data.
    pub fn with_data(hashes: HashMap<String, Mapping>) -> Self {
        Self {
            hashes: RwLock::new(hashes),
        }
    }

    /// Number of namespace keys currently holding at least one field.
    pub fn key_count(&self) -> usize {
        self.read_lock().len()
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.write_lock().clear();
    }

    // Every mutation is a single insert or extend, so a poisoned lock still
    // guards valid data.
    fn read_lock(&self) -> RwLockReadGuard<'_, HashMap<String, Mapping>> {
        self.hashes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, HashMap<String, Mapping>> {
        self.hashes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HashStore for InMemoryHashStore {
    fn get_all(&self, key: &str) -> StoreResult<Mapping> {
        Ok(self.read_lock().get(key).cloned().unwrap_or_default())
    }

    fn get_field(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        Ok(self
            .read_lock()
            .get(key)
            .and_then(|hash| hash.get(field))
            .cloned())
    }

    fn get_fields(&self, key: &str, fields: &[&str]) -> StoreResult<Vec<Option<String>>> {
        let hashes = self.read_lock();
        let hash = hashes.get(key);
        Ok(fields
            .iter()
            .map(|field| hash.and_then(|h| h.get(*field)).cloned())
            .collect())
    }

    fn set_field(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        self.write_lock()
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    fn set_fields(&self, key: &str, pairs: &Mapping) -> StoreResult<()> {
        if pairs.is_empty() {
            return Ok(());
        }
        self.write_lock()
            .entry(key.to_string())
            .or_default()
            .extend(pairs.iter().map(|(f, v)| (f.clone(), v.clone())));
        Ok(())
    }

    fn set_field_if_absent(&self, key: &str, field: &str, value: &str) -> StoreResult<bool> {
        let mut hashes = self.write_lock();
        let hash = hashes.entry(key.to_string()).or_default();
        if hash.contains_key(field) {
            return Ok(false);
        }
        hash.insert(field.to_string(), value.to_string());
        Ok(true)
    }
}
