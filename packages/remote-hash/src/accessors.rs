//! The read facet.

use std::collections::BTreeSet;

use remote_hash_store::Mapping;

use crate::{HashError, HashResult};

/// Read-only access to a hash, with the queries a native map offers.
///
/// Only [`to_mapping`](ReadableHash::to_mapping) is required; everything
/// else is derived from a freshly materialized view. Each call fetches
/// again, so two calls may see different states if a writer intervenes.
/// Use one [`to_mapping`](ReadableHash::to_mapping) or
/// [`fetch_many`](ReadableHash::fetch_many) call when fields must be read
/// from a single consistent state.
///
/// Implementors may override the field-level methods ([`get`], [`fetch_many`])
/// with cheaper commands as long as each stays a single atomic read.
///
/// [`get`]: ReadableHash::get
/// [`fetch_many`]: ReadableHash::fetch_many
pub trait ReadableHash {
    /// Materialize the whole hash. An absent hash is an empty mapping.
    fn to_mapping(&self) -> HashResult<Mapping>;

    /// The value of `field`, or `None` if it is absent.
    fn get(&self, field: &str) -> HashResult<Option<String>> {
        Ok(self.to_mapping()?.remove(field))
    }

    /// The value of `field`.
    ///
    /// # Errors
    ///
    /// [`HashError::KeyNotFound`] naming `field` if it is absent.
    fn fetch(&self, field: &str) -> HashResult<String> {
        self.get(field)?.ok_or_else(|| HashError::KeyNotFound {
            field: field.to_string(),
        })
    }

    /// The value of `field`, or `default` if it is absent.
    fn fetch_or(&self, field: &str, default: &str) -> HashResult<String> {
        Ok(self.get(field)?.unwrap_or_else(|| default.to_string()))
    }

    /// The value of `field`, or `fallback(field)` if it is absent.
    ///
    /// The fallback only runs on absence.
    fn fetch_or_else<F>(&self, field: &str, fallback: F) -> HashResult<String>
    where
        F: FnOnce(&str) -> String,
        Self: Sized,
    {
        Ok(self.get(field)?.unwrap_or_else(|| fallback(field)))
    }

    /// One entry per requested field, in request order, `None` when absent.
    ///
    /// Accepts an array, a slice or any iterator of field names, so
    /// `fetch_many(["a", "b"])` and `fetch_many(&fields)` behave the same.
    fn fetch_many<I>(&self, fields: I) -> HashResult<Vec<Option<String>>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        Self: Sized,
    {
        let mapping = self.to_mapping()?;
        Ok(fields
            .into_iter()
            .map(|field| mapping.get(field.as_ref()).cloned())
            .collect())
    }

    /// Like [`fetch_many`](ReadableHash::fetch_many), but every field must
    /// be present.
    ///
    /// # Errors
    ///
    /// [`HashError::KeyNotFound`] naming the first absent field.
    fn fetch_values<I>(&self, fields: I) -> HashResult<Vec<String>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        Self: Sized,
    {
        let names: Vec<String> = fields.into_iter().map(|f| f.as_ref().to_string()).collect();
        let values = self.fetch_many(&names)?;
        names
            .into_iter()
            .zip(values)
            .map(|(field, value)| value.ok_or(HashError::KeyNotFound { field }))
            .collect()
    }

    /// Whether `field` currently has a value.
    fn contains_key(&self, field: &str) -> HashResult<bool> {
        Ok(self.get(field)?.is_some())
    }

    /// Every field name.
    fn keys(&self) -> HashResult<BTreeSet<String>> {
        Ok(self.to_mapping()?.into_keys().collect())
    }

    /// Every value, in field order.
    fn values(&self) -> HashResult<Vec<String>> {
        Ok(self.to_mapping()?.into_values().collect())
    }

    /// Number of fields.
    fn len(&self) -> HashResult<usize> {
        Ok(self.to_mapping()?.len())
    }

    /// Whether the hash has no fields (or does not exist).
    fn is_empty(&self) -> HashResult<bool> {
        Ok(self.to_mapping()?.is_empty())
    }

    /// The `(field, value)` pair for `field`.
    fn assoc(&self, field: &str) -> HashResult<Option<(String, String)>> {
        Ok(self
            .get(field)?
            .map(|value| (field.to_string(), value)))
    }

    /// The first `(field, value)` pair, in field order, whose value is `value`.
    fn reverse_assoc_for(&self, value: &str) -> HashResult<Option<(String, String)>> {
        Ok(self.to_mapping()?.into_iter().find(|(_, v)| v == value))
    }

    /// The first field, in field order, holding `value`.
    fn key_for(&self, value: &str) -> HashResult<Option<String>> {
        Ok(self.reverse_assoc_for(value)?.map(|(field, _)| field))
    }

    /// The mapping without empty values.
    ///
    /// Stored values are strings, so the empty string stands in for nil.
    fn compact(&self) -> HashResult<Mapping> {
        let mut mapping = self.to_mapping()?;
        mapping.retain(|_, value| !value.is_empty());
        Ok(mapping)
    }

    /// The value at `field`. Values are flat strings, so there is nothing
    /// deeper to dig into.
    fn dig(&self, field: &str) -> HashResult<Option<String>> {
        self.get(field)
    }

    /// `[field1, value1, field2, value2, ...]` in field order.
    fn flatten(&self) -> HashResult<Vec<String>> {
        Ok(self
            .to_mapping()?
            .into_iter()
            .flat_map(|(field, value)| [field, value])
            .collect())
    }

    /// A freshly materialized copy of the hash.
    fn rehash(&self) -> HashResult<Mapping> {
        self.to_mapping()
    }

    /// The hash with `pairs` laid over it. Remote state is not touched.
    fn merged<I, K, V>(&self, pairs: I) -> HashResult<Mapping>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
        Self: Sized,
    {
        let mut mapping = self.to_mapping()?;
        mapping.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        Ok(mapping)
    }
}
