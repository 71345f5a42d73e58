//! # remote-hash-resp
//!
//! A [`HashStore`](remote_hash_store::HashStore) backend that speaks the
//! Redis serialization protocol (RESP2) over a blocking TCP connection.
//!
//! Works against Redis, Valkey, KeyDB and anything else that implements the
//! `H*` hash commands.
//!
//! ## Example
//!
//! ```ignore
//! use remote_hash_resp::RespHashStore;
//! use remote_hash_store::{HashStore, StoreConfig};
//!
//! let config = StoreConfig::new("redis://127.0.0.1:6379/0").with_password("secret");
//! let store = RespHashStore::from_config(&config)?;
//!
//! store.set_field("user:1", "name", "Alice")?;
//! assert_eq!(store.get_field("user:1", "name")?.as_deref(), Some("Alice"));
//! ```

pub mod codec;

mod client;
mod connection;

pub use client::{RespHashStore, DEFAULT_PORT};
pub use codec::{CodecError, Frame, FrameScanner};
pub use connection::Connection;
