//! Error types for ifsc-ledger
//!
//! Two families live here:
//! - [`Error`] is what the library surfaces to callers (configuration, record store I/O)
//! - [`FetchError`] describes a single failed try against a lookup endpoint. It never
//!   leaves the resolver: the worst outcome a caller sees is an unresolved lookup.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ifsc-ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ifsc-ledger
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "endpoints")
        key: Option<String>,
    },

    /// Record store error
    #[error("record store error: {0}")]
    Store(#[from] StoreError),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be constructed
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build a configuration error for a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Process exit code the CLI uses when this error ends a run
    ///
    /// Configuration problems are usage errors (2); everything else is a
    /// runtime failure (1).
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Config { .. } => 2,
            Error::Store(_)
            | Error::Csv(_)
            | Error::Io(_)
            | Error::Network(_)
            | Error::Serialization(_) => 1,
        }
    }
}

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Existing file carries a header other than the canonical one
    #[error("unexpected header in {}: found [{}]", .path.display(), .found.join(", "))]
    HeaderMismatch {
        /// The store file that was read
        path: PathBuf,
        /// Header fields found in the file
        found: Vec<String>,
    },

    /// The rewritten file could not be moved over the destination
    #[error("failed to replace {}: {source}", .path.display())]
    Persist {
        /// The destination that was left untouched
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single try against one lookup endpoint
#[derive(Debug, Error)]
pub enum FetchError {
    /// The endpoint template did not produce a usable URL
    #[error("invalid endpoint URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL after code substitution
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// No response within the request timeout
    #[error("request to {url} timed out")]
    Timeout {
        /// The requested URL
        url: String,
    },

    /// Connection could not be established
    #[error("connection to {url} failed: {source}")]
    Connect {
        /// The requested URL
        url: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Endpoint answered with something other than 200 OK
    #[error("{url} answered HTTP {status}")]
    Status {
        /// The requested URL
        url: String,
        /// HTTP status code received
        status: u16,
    },

    /// Any other transport-level failure (body read, redirect loop, ...)
    #[error("request to {url} failed: {source}")]
    Transport {
        /// The requested URL
        url: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// 200 OK, but the body is not a JSON object
    #[error("unusable response body from {url}: {reason}")]
    InvalidBody {
        /// The requested URL
        url: String,
        /// Why the body was rejected
        reason: String,
    },
}

impl FetchError {
    /// Classify a reqwest error raised while sending a request
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            FetchError::Timeout { url }
        } else if source.is_connect() {
            FetchError::Connect { url, source }
        } else {
            FetchError::Transport { url, source }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_is_a_usage_failure() {
        let err = Error::config("at least one endpoint is required", "endpoints");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "configuration error: at least one endpoint is required"
        );
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("endpoints")),
            other => panic!("expected Config, got {other:?}"),
        }
    }

    #[test]
    fn store_and_io_errors_are_runtime_failures() {
        let io = Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(io.exit_code(), 1);

        let store = Error::Store(StoreError::HeaderMismatch {
            path: PathBuf::from("IFSC_CODE.csv"),
            found: vec!["a".into(), "b".into()],
        });
        assert_eq!(store.exit_code(), 1);
    }

    #[test]
    fn header_mismatch_message_lists_found_columns() {
        let err = StoreError::HeaderMismatch {
            path: PathBuf::from("ledger.csv"),
            found: vec!["code".into(), "name".into()],
        };
        assert_eq!(
            err.to_string(),
            "unexpected header in ledger.csv: found [code, name]"
        );
    }

    #[test]
    fn status_error_mentions_url_and_code() {
        let err = FetchError::Status {
            url: "https://ifsc.razorpay.com/SBIN0000001".into(),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "https://ifsc.razorpay.com/SBIN0000001 answered HTTP 503"
        );
    }
}
