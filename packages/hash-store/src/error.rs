//! Error types for the store layer.
//!
//! Errors at this level are transport-focused. Semantic errors like
//! "field not found" or "field already defined" belong to the hash layer.

/// Errors raised by a [`HashStore`](crate::HashStore) client.
///
/// Callers above the store layer surface these unchanged. Nothing at this
/// level retries or masks a failure.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Generic I/O or network failure.
    ///
    /// Connection refused, reset, timed out, DNS failure and so on.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The remote store answered with an error reply.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// The remote store answered with a non-success status code.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The reply was well-formed but not the shape the command expects.
    #[error("unexpected reply to {command}: {reply}")]
    UnexpectedReply { command: String, reply: String },

    /// The reply could not be decoded into strings.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// The client configuration is unusable.
    #[error("invalid store config: {message}")]
    InvalidConfig { message: String },

    /// The backend cannot address a key or field with this name.
    #[error("cannot address {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// No backend is registered for the configured URL scheme.
    #[error("unsupported store scheme: {scheme}")]
    UnsupportedScheme { scheme: String },
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Transport(Box::new(e))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
