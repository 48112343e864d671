use thiserror::Error;

use crate::context::ContextError;

#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("Failed to open data store at {url}: {reason}")]
    Construction { url: String, reason: String },

    #[error("Not found: {key}")]
    NotFound { key: String },

    #[error("{op} failed for {key}: {source}")]
    Io {
        op: &'static str,
        key: String,
        #[source]
        source: object_store::Error,
    },

    #[error("{op} failed for {key}: content transfer error: {source}")]
    Transfer {
        op: &'static str,
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{op} cancelled for {key}")]
    Cancelled { op: &'static str, key: String },

    #[error("{op} deadline exceeded for {key}")]
    DeadlineExceeded { op: &'static str, key: String },

    #[error("{op} called on a closed data store")]
    Closed { op: &'static str },
}

impl DataStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataStoreError::NotFound { .. })
    }

    pub(crate) fn io(op: &'static str, key: &str, source: object_store::Error) -> Self {
        DataStoreError::Io {
            op,
            key: key.to_string(),
            source,
        }
    }

    pub(crate) fn transfer(op: &'static str, key: &str, source: std::io::Error) -> Self {
        DataStoreError::Transfer {
            op,
            key: key.to_string(),
            source,
        }
    }

    pub(crate) fn from_context(op: &'static str, key: &str, err: ContextError) -> Self {
        let key = key.to_string();
        match err {
            ContextError::Cancelled => DataStoreError::Cancelled { op, key },
            ContextError::DeadlineExceeded => DataStoreError::DeadlineExceeded { op, key },
        }
    }
}

/// Storage result type
pub type Result<T> = std::result::Result<T, DataStoreError>;
