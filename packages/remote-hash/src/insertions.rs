//! The write facet.

use remote_hash_store::Mapping;

use crate::{HashError, HashResult};

/// Mutation of a hash, one atomic remote command per call.
///
/// There is no local read-modify-write: every method maps to a single
/// command, so concurrent writers need no client-side locking. A call that
/// fails leaves the hash exactly as it was.
pub trait WritableHash {
    /// Unconditionally set `field` to `value`. Returns the value.
    fn store(&self, field: &str, value: &str) -> HashResult<String>;

    /// Set every pair of `pairs` in one atomic bulk command.
    ///
    /// This is the object-safe form of
    /// [`merge_assign`](WritableHash::merge_assign).
    fn store_all(&self, pairs: &Mapping) -> HashResult<()>;

    /// Set `field` only if it has no value yet.
    ///
    /// Returns `true` if the value was written, `false` if the field was
    /// already set (its value is left alone).
    fn set_if_absent(&self, field: &str, value: &str) -> HashResult<bool>;

    /// Same as [`store`](WritableHash::store).
    fn set_field(&self, field: &str, value: &str) -> HashResult<String> {
        self.store(field, value)
    }

    /// Merge `pairs` into the hash in one atomic bulk command.
    ///
    /// Given fields overwrite existing values; fields not given are left
    /// untouched. Readers never observe a partial merge. If a field appears
    /// more than once in `pairs`, the last occurrence wins.
    fn merge_assign<I, K, V>(&self, pairs: I) -> HashResult<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
        Self: Sized,
    {
        let pairs: Mapping = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.store_all(&pairs)?;
        Ok(self)
    }

    /// Same as [`merge_assign`](WritableHash::merge_assign).
    fn update<I, K, V>(&self, pairs: I) -> HashResult<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
        Self: Sized,
    {
        self.merge_assign(pairs)
    }

    /// Set `field` only if it has no value yet, and fail otherwise.
    ///
    /// # Errors
    ///
    /// [`HashError::AlreadyDefined`] naming `field` if it already has a
    /// value. Nothing is written in that case.
    fn set_if_absent_or_fail(&self, field: &str, value: &str) -> HashResult<String> {
        if self.set_if_absent(field, value)? {
            Ok(value.to_string())
        } else {
            Err(HashError::AlreadyDefined {
                field: field.to_string(),
            })
        }
    }
}
