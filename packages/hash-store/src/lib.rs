//! remote-hash-store: the Remote Store Client contract
//!
//! This is the narrow waist of the remote-hash stack. A [`HashStore`] exposes
//! atomic, per-command operations on a hash-shaped key in a shared store:
//!
//! - get-all-fields, get-one-field, get-many-fields
//! - set-one-field, set-many-fields, set-field-if-absent
//!
//! Values are opaque strings. No type coercion, no caching, no retries -
//! those belong (or don't) in higher layers.
//!
//! Backends live in their own crates (`remote-hash-http`,
//! `remote-hash-resp`); this crate carries the trait, the error type, the
//! shared [`StoreConfig`] and an [`InMemoryHashStore`] reference backend.
//!
//! # Example
//!
//! ```rust
//! use remote_hash_store::{HashStore, InMemoryHashStore, Mapping};
//!
//! fn seed(store: &dyn HashStore) -> remote_hash_store::StoreResult<Mapping> {
//!     store.set_field("session:42", "user", "alice")?;
//!     store.get_all("session:42")
//! }
//!
//! let mapping = seed(&InMemoryHashStore::new()).unwrap();
//! assert_eq!(mapping.len(), 1);
//! ```

mod config;
mod error;
mod in_memory;
mod traits;

pub use config::{StoreConfig, DEFAULT_TIMEOUT_MS};
pub use error::{StoreError, StoreResult};
pub use in_memory::InMemoryHashStore;
pub use traits::{HashStore, Mapping};
