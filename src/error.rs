//! Error kinds shared by the store, embedder, and service layers.
//!
//! The vector kernel and the cache never error; everything else surfaces
//! one of these kinds so the HTTP facade can map them to status codes.

use thiserror::Error;

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("memory not found: {0}")]
    NotFound(String),

    #[error("memory already exists: {0}")]
    Conflict(String),

    #[error("embedder unreachable: {0}")]
    EmbedderUnavailable(#[from] reqwest::Error),

    #[error("embedder returned status {status}: {body}")]
    EmbedderBadStatus { status: u16, body: String },

    #[error("malformed embedder response: {0}")]
    MalformedResponse(String),

    #[error("failed to embed batch item {index}: {source}")]
    BatchItem {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("{context}: {source}")]
    Store {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    /// SQLITE_BUSY / SQLITE_LOCKED; the caller may retry the operation.
    #[error("database busy")]
    Busy,

    #[error("connection pool: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wraps an engine error with operation context, routing lock
    /// contention to the retryable `Busy` kind.
    pub fn store(context: impl Into<String>, source: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(e, _) = &source {
            if matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ) {
                return Error::Busy;
            }
        }
        Error::Store {
            context: context.into(),
            source,
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_is_retryable() {
        assert!(Error::Busy.is_retryable());
        assert!(!Error::NotFound("x".into()).is_retryable());
        assert!(!Error::InvalidArgument("x".into()).is_retryable());
    }

    #[test]
    fn test_store_wraps_context() {
        let err = Error::store(
            "failed to insert memory",
            rusqlite::Error::InvalidQuery,
        );
        assert!(err.to_string().contains("failed to insert memory"));
    }
}
