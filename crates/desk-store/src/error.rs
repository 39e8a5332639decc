/// Errors from document storage.
///
/// Every variant means the persisted document could not be read or written;
/// callers surface all of them as "storage unavailable".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing medium could not be read or written.
    #[error("storage unavailable at {location}: {source}")]
    Unavailable {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// The persisted document exists but is not a valid document.
    #[error("malformed document at {location}: {source}")]
    Malformed {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn unavailable(location: impl Into<String>, source: std::io::Error) -> Self {
        Self::Unavailable {
            location: location.into(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
