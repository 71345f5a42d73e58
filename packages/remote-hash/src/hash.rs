//! The core container: a namespace key bound to a store client.

use std::fmt;

use remote_hash_store::{HashStore, Mapping};

use crate::{HashError, HashResult, ReadableHash, WritableHash};

/// A hash that lives in a remote store.
///
/// `RemoteHash` is a capability handle, not a container: it holds the
/// namespace key and a store client, and every operation is a round trip.
/// Nothing is cached between calls. Dropping it leaves the remote data
/// alone, and any number of handles (in any number of processes) may point
/// at the same key.
///
/// The store can be borrowed (`&InMemoryHashStore`), shared
/// (`Arc<RespHashStore>`) or boxed (`Box<dyn HashStore>`).
///
/// # Example
///
/// ```rust
/// use remote_hash::{ReadableHash, RemoteHash, WritableHash};
/// use remote_hash_store::InMemoryHashStore;
///
/// let store = InMemoryHashStore::new();
/// let hash = RemoteHash::new(&store, "task:7").unwrap();
///
/// hash.store("state", "running").unwrap();
/// assert!(!hash.set_if_absent("state", "queued").unwrap());
/// assert_eq!(hash.fetch("state").unwrap(), "running");
/// ```
#[derive(Clone)]
pub struct RemoteHash<S> {
    store: S,
    namespace_key: String,
}

impl<S: HashStore> RemoteHash<S> {
    /// Bind `namespace_key` to `store`.
    ///
    /// # Errors
    ///
    /// [`HashError::EmptyKey`] if the key is empty.
    pub fn new(store: S, namespace_key: impl Into<String>) -> HashResult<Self> {
        let namespace_key = namespace_key.into();
        if namespace_key.is_empty() {
            return Err(HashError::EmptyKey);
        }
        Ok(Self {
            store,
            namespace_key,
        })
    }

    /// The key identifying the backing hash.
    pub fn namespace_key(&self) -> &str {
        &self.namespace_key
    }

    /// The store client.
    pub fn store_client(&self) -> &S {
        &self.store
    }
}

impl<S> fmt::Debug for RemoteHash<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteHash")
            .field("namespace_key", &self.namespace_key)
            .finish_non_exhaustive()
    }
}

impl<S: HashStore> ReadableHash for RemoteHash<S> {
    fn to_mapping(&self) -> HashResult<Mapping> {
        Ok(self.store.get_all(&self.namespace_key)?)
    }

    fn get(&self, field: &str) -> HashResult<Option<String>> {
        Ok(self.store.get_field(&self.namespace_key, field)?)
    }

    fn fetch_many<I>(&self, fields: I) -> HashResult<Vec<Option<String>>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        Self: Sized,
    {
        let fields: Vec<I::Item> = fields.into_iter().collect();
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        let fields: Vec<&str> = fields.iter().map(|f| f.as_ref()).collect();
        Ok(self.store.get_fields(&self.namespace_key, &fields)?)
    }
}

impl<S: HashStore> WritableHash for RemoteHash<S> {
    fn store(&self, field: &str, value: &str) -> HashResult<String> {
        self.store.set_field(&self.namespace_key, field, value)?;
        Ok(value.to_string())
    }

    fn store_all(&self, pairs: &Mapping) -> HashResult<()> {
        if pairs.is_empty() {
            return Ok(());
        }
        self.store.set_fields(&self.namespace_key, pairs)?;
        Ok(())
    }

    fn set_if_absent(&self, field: &str, value: &str) -> HashResult<bool> {
        let set = self
            .store
            .set_field_if_absent(&self.namespace_key, field, value)?;
        if !set {
            log::debug!("{} already set in {}", field, self.namespace_key);
        }
        Ok(set)
    }
}
