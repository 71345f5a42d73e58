//! The remote store contract.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::StoreResult;

/// A field -> value mapping for one namespace key.
///
/// Ordered so that enumeration is deterministic across calls and backends.
pub type Mapping = BTreeMap<String, String>;

/// Atomic per-command operations on a hash-shaped key.
///
/// Every method is exactly one command against the remote store and is
/// atomic with respect to every other command on the same key. Nothing is
/// atomic across calls.
///
/// Methods take `&self` so one client can back many hashes and threads.
/// Implementations serialize access to their connection internally.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn HashStore>`.
pub trait HashStore: Send + Sync {
    /// Fetch every field of `key`.
    ///
    /// An absent key is an empty mapping, not an error.
    fn get_all(&self, key: &str) -> StoreResult<Mapping>;

    /// Fetch one field of `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The key or the field does not exist.
    /// * `Ok(Some(value))` - The current value.
    /// * `Err(StoreError)` - A transport or protocol error occurred.
    fn get_field(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    /// Fetch several fields of `key` in one command.
    ///
    /// The result has one entry per requested field, in request order, with
    /// `None` for each absent field.
    fn get_fields(&self, key: &str, fields: &[&str]) -> StoreResult<Vec<Option<String>>>;

    /// Unconditionally set one field.
    fn set_field(&self, key: &str, field: &str, value: &str) -> StoreResult<()>;

    /// Set every pair of `pairs` in one indivisible command.
    ///
    /// Fields not named in `pairs` are left untouched. A concurrent reader
    /// never observes a partial application.
    fn set_fields(&self, key: &str, pairs: &Mapping) -> StoreResult<()>;

    /// Set `field` only if it does not exist yet.
    ///
    /// Returns `true` if the value was written, `false` if the field already
    /// had a value (which is left unchanged).
    fn set_field_if_absent(&self, key: &str, field: &str, value: &str) -> StoreResult<bool>;
}

// Blanket implementations for references and smart pointers

impl<T: HashStore + ?Sized> HashStore for &T {
    fn get_all(&self, key: &str) -> StoreResult<Mapping> {
        (**self).get_all(key)
    }

    fn get_field(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        (**self).get_field(key, field)
    }

    fn get_fields(&self, key: &str, fields: &[&str]) -> StoreResult<Vec<Option<String>>> {
        (**self).get_fields(key, fields)
    }

    fn set_field(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        (**self).set_field(key, field, value)
    }

    fn set_fields(&self, key: &str, pairs: &Mapping) -> StoreResult<()> {
        (**self).set_fields(key, pairs)
    }

    fn set_field_if_absent(&self, key: &str, field: &str, value: &str) -> StoreResult<bool> {
        (**self).set_field_if_absent(key, field, value)
    }
}

impl<T: HashStore + ?Sized> HashStore for Box<T> {
    fn get_all(&self, key: &str) -> StoreResult<Mapping> {
        self.as_ref().get_all(key)
    }

    fn get_field(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        self.as_ref().get_field(key, field)
    }

    fn get_fields(&self, key: &str, fields: &[&str]) -> StoreResult<Vec<Option<String>>> {
        self.as_ref().get_fields(key, fields)
    }

    fn set_field(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        self.as_ref().set_field(key, field, value)
    }

    fn set_fields(&self, key: &str, pairs: &Mapping) -> StoreResult<()> {
        self.as_ref().set_fields(key, pairs)
    }

    fn set_field_if_absent(&self, key: &str, field: &str, value: &str) -> StoreResult<bool> {
        self.as_ref().set_field_if_absent(key, field, value)
    }
}

impl<T: HashStore + ?Sized> HashStore for Arc<T> {
    fn get_all(&self, key: &str) -> StoreResult<Mapping> {
        self.as_ref().get_all(key)
    }

    fn get_field(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        self.as_ref().get_field(key, field)
    }

    fn get_fields(&self, key: &str, fields: &[&str]) -> StoreResult<Vec<Option<String>>> {
        self.as_ref().get_fields(key, fields)
    }

    fn set_field(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        self.as_ref().set_field(key, field, value)
    }

    fn set_fields(&self, key: &str, pairs: &Mapping) -> StoreResult<()> {
        self.as_ref().set_fields(key, pairs)
    }

    fn set_field_if_absent(&self, key: &str, field: &str, value: &str) -> StoreResult<bool> {
        self.as_ref().set_field_if_absent(key, field, value)
    }
}
