use remote_hash_store::StoreError;

/// Errors from remote hash operations.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// `fetch` found no value and had no default or fallback.
    #[error("key not found: \"{field}\"")]
    KeyNotFound { field: String },

    /// A fail-on-conflict conditional set found the field already set.
    /// No mutation happened.
    #[error("{field} already defined")]
    AlreadyDefined { field: String },

    /// A hash cannot live under an empty namespace key.
    #[error("namespace key must not be empty")]
    EmptyKey,

    /// The store client failed. Surfaced exactly as the client reported it.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HashError {
    /// The field named by a `KeyNotFound` or `AlreadyDefined` error.
    pub fn field(&self) -> Option<&str> {
        match self {
            HashError::KeyNotFound { field } | HashError::AlreadyDefined { field } => Some(field),
            HashError::EmptyKey | HashError::Store(_) => None,
        }
    }
}

/// Result alias for remote hash operations.
pub type HashResult<T> = Result<T, HashError>;
