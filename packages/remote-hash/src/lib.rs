//! # remote-hash
//!
//! A key/value mapping whose state lives in a shared remote store.
//!
//! [`RemoteHash`] looks like a native map - read, write, enumerate,
//! conditional insert, bulk merge - but every operation is one atomic
//! command against the hash stored under its namespace key. Nothing is
//! cached locally, so every read reflects the latest committed state at the
//! time of that call.
//!
//! ## Facets
//!
//! The two capabilities are separate traits, both implemented by
//! [`RemoteHash`]:
//!
//! - [`ReadableHash`]: `get`, `fetch` (with default or fallback),
//!   `fetch_many`, `keys`, `values`, `len` and the structural queries
//!   (`compact`, `dig`, `flatten`, `key_for`, `reverse_assoc_for`, `rehash`)
//! - [`WritableHash`]: `store` / `set_field`, `merge_assign` / `update`,
//!   `set_if_absent`, `set_if_absent_or_fail`
//!
//! Code that only needs one capability can take `&impl ReadableHash`.
//!
//! ## Backends
//!
//! Any [`HashStore`] works. [`StoreRegistry`] picks one from a
//! [`StoreConfig`] URL:
//!
//! ```rust
//! use remote_hash::{ReadableHash, StoreRegistry, WritableHash};
//! use remote_hash_store::StoreConfig;
//!
//! let config = StoreConfig::new("memory://local");
//! let hash = StoreRegistry::with_defaults().open(&config, "user:42").unwrap();
//!
//! hash.merge_assign([("name", "Alice"), ("role", "admin")]).unwrap();
//! assert_eq!(hash.fetch_many(["name", "email"]).unwrap(), vec![Some("Alice".to_string()), None]);
//! ```
//!
//! ## Consistency
//!
//! Each call is atomic; a sequence of calls is not. Reading `keys()` and
//! then fetching each key can observe two different states if a concurrent
//! writer runs in between. Read everything you need in one `to_mapping()` or
//! `fetch_many()` call when that matters.

mod accessors;
mod error;
mod hash;
mod insertions;
mod registry;

pub use accessors::ReadableHash;
pub use error::{HashError, HashResult};
pub use hash::RemoteHash;
pub use insertions::WritableHash;
pub use registry::{connect, Connector, StoreRegistry};

pub use remote_hash_store::{
    HashStore, InMemoryHashStore, Mapping, StoreConfig, StoreError, StoreResult,
};

#[cfg(feature = "http")]
pub use remote_hash_http::HttpHashStore;

#[cfg(feature = "resp")]
pub use remote_hash_resp::RespHashStore;
