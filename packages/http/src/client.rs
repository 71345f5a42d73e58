//! Blocking HTTP client for the JSON hash protocol.
//!
//! Keys and fields travel as percent-encoded path segments under the
//! configured base URL; bulk payloads travel as JSON bodies.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use url::Url;

use remote_hash_store::{HashStore, Mapping, StoreConfig, StoreError, StoreResult};

use crate::error::Error;
use crate::types::{FieldsRequest, SetIfAbsentResponse, MGET_SEGMENT, SETNX_SEGMENT};

/// A hash store reached over HTTP.
///
/// Each [`HashStore`] method is exactly one blocking request; the server is
/// responsible for applying it atomically. See [`crate::types`] for the
/// routes.
///
/// # Example
///
/// ```ignore
/// use remote_hash_http::HttpHashStore;
/// use remote_hash_store::HashStore;
///
/// let store = HttpHashStore::new("https://hashes.example.com/v1/")?;
///
/// store.set_field("user:123", "name", "Alice")?;
/// let user = store.get_all("user:123")?;
/// ```
pub struct HttpHashStore {
    client: Client,
    base_url: Url,
}

impl HttpHashStore {
    /// Create a store rooted at `base_url` with default settings.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Self::from_config(&StoreConfig::new(base_url))
    }

    /// Create a store from a config: URL, timeout and default headers.
    pub fn from_config(config: &StoreConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            headers.insert(
                HeaderName::try_from(name.as_str())?,
                HeaderValue::try_from(value.as_str())?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Self::with_client(client, &config.url)
    }

    /// Create a store with a custom reqwest client.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                message: format!("{} cannot be a base URL", base_url),
            });
        }

        Ok(Self { client, base_url })
    }

    /// The root every key is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the URL for a key and optional trailing segments.
    ///
    /// Segments are percent-encoded, so keys and fields may contain `/`.
    /// A segment that is exactly `.` or `..` is rejected: URL normalization
    /// would drop it (escaped or not) and hit a different route.
    fn build_url(&self, segments: &[&str]) -> Result<Url, Error> {
        if let Some(dot) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(Error::DotSegment {
                segment: dot.to_string(),
            });
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl {
                message: format!("{} cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let request = request.build()?;
        log::debug!("{} {}", request.method(), request.url());
        Ok(self.client.execute(request)?)
    }

    /// Pass 2xx responses through; turn anything else into `Error::Status`.
    fn check(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                log::warn!("could not read {} response body: {}", status, e);
                format!("(unreadable body: {})", e)
            }
        };
        log::warn!("hash store answered {}: {}", status, body);
        Err(Error::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn fetch_all(&self, key: &str) -> Result<Mapping, Error> {
        let url = self.build_url(&[key])?;
        let response = self.send(self.client.get(url))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Mapping::new());
        }
        Ok(Self::check(response)?.json()?)
    }

    fn fetch_field(&self, key: &str, field: &str) -> Result<Option<String>, Error> {
        let url = self.build_url(&[key, field])?;
        let response = self.send(self.client.get(url))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::check(response)?.json()?))
    }

    fn fetch_fields(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>, Error> {
        let url = self.build_url(&[key, MGET_SEGMENT])?;
        let body = FieldsRequest {
            fields: fields.iter().map(|f| f.to_string()).collect(),
        };
        let response = self.send(self.client.post(url).json(&body))?;
        Ok(Self::check(response)?.json()?)
    }

    fn put_field(&self, key: &str, field: &str, value: &str) -> Result<(), Error> {
        let url = self.build_url(&[key, field])?;
        Self::check(self.send(self.client.put(url).json(value))?)?;
        Ok(())
    }

    fn patch_fields(&self, key: &str, pairs: &Mapping) -> Result<(), Error> {
        let url = self.build_url(&[key])?;
        Self::check(self.send(self.client.patch(url).json(pairs))?)?;
        Ok(())
    }

    fn put_field_if_absent(&self, key: &str, field: &str, value: &str) -> Result<bool, Error> {
        let url = self.build_url(&[key, field, SETNX_SEGMENT])?;
        let response = self.send(self.client.post(url).json(value))?;
        let reply: SetIfAbsentResponse = Self::check(response)?.json()?;
        Ok(reply.set)
    }
}

impl HashStore for HttpHashStore {
    fn get_all(&self, key: &str) -> StoreResult<Mapping> {
        Ok(self.fetch_all(key)?)
    }

    fn get_field(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        Ok(self.fetch_field(key, field)?)
    }

    fn get_fields(&self, key: &str, fields: &[&str]) -> StoreResult<Vec<Option<String>>> {
        let values = self.fetch_fields(key, fields)?;
        if values.len() != fields.len() {
            return Err(StoreError::UnexpectedReply {
                command: MGET_SEGMENT.to_string(),
                reply: format!("{} values for {} fields", values.len(), fields.len()),
            });
        }
        Ok(values)
    }

    fn set_field(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        Ok(self.put_field(key, field, value)?)
    }

    fn set_fields(&self, key: &str, pairs: &Mapping) -> StoreResult<()> {
        Ok(self.patch_fields(key, pairs)?)
    }

    fn set_field_if_absent(&self, key: &str, field: &str, value: &str) -> StoreResult<bool> {
        Ok(self.put_field_if_absent(key, field, value)?)
    }
}
