//! # remote-hash-http
//!
//! A [`HashStore`](remote_hash_store::HashStore) backend that maps every
//! hash command to one HTTP request against a hash server.
//!
//! ## Protocol
//!
//! - get all → `GET /{key}` → JSON object, 404 means empty
//! - get one → `GET /{key}/{field}` → JSON string, 404 means absent
//! - set one → `PUT /{key}/{field}` with a JSON string body
//! - set many → `PATCH /{key}` with a JSON object body (one atomic write)
//!
//! See [`types`] for the full table.
//!
//! ## Example
//!
//! ```ignore
//! use remote_hash_http::HttpHashStore;
//! use remote_hash_store::{HashStore, StoreConfig};
//!
//! let config = StoreConfig::new("http://localhost:8080/hashes/")
//!     .with_header("Authorization", "Bearer token");
//! let store = HttpHashStore::from_config(&config)?;
//!
//! store.set_field("user:1", "name", "Alice")?;
//! ```

pub mod error;
pub mod types;

mod client;

pub use client::HttpHashStore;
pub use error::Error;
pub use types::{FieldsRequest, SetIfAbsentResponse};
