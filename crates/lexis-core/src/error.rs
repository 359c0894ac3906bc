//! Error types and handling for lexis-core operations.
//!
//! This module provides a single error type that covers every failure a
//! dictionary lookup can surface. Errors are categorized for logging and carry
//! a recoverability hint for callers that want to retry on their own.
//!
//! ## Error Categories
//!
//! - **Transport Errors**: the dictionary page could not be fetched
//!   (connection failures, non-2xx responses)
//! - **Storage Errors**: the entry store could not be read or written
//! - **Serialization Errors**: JSON columns or TOML configuration
//! - **Configuration Errors**: invalid settings or config files
//! - **Request Errors**: a request was rejected before entering the pipeline
//!
//! ## Lookup Stages
//!
//! Failures inside the cache-aside pipeline are wrapped in [`Error::Lookup`],
//! which names the stage that failed so callers can tell a store outage from
//! an unreachable dictionary:
//!
//! ```rust
//! use lexis_core::{Error, LookupStage};
//!
//! let err = Error::Lookup {
//!     stage: LookupStage::Fetch,
//!     source: Box::new(Error::Http {
//!         url: "https://www.ldoceonline.com/dictionary/run".to_string(),
//!         status: 503,
//!     }),
//! };
//!
//! assert_eq!(err.stage(), Some(LookupStage::Fetch));
//! assert!(err.to_string().starts_with("fetch failed"));
//! ```

use std::fmt;

use thiserror::Error;

/// The pipeline stage in which a lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupStage {
    /// Reading entries from the store (initial cache check or final re-read).
    Query,
    /// Fetching the dictionary page.
    Fetch,
    /// Writing freshly parsed entries to the store.
    Insert,
}

impl LookupStage {
    /// Stage marker prefixed to wrapped errors.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Query => "query failed",
            Self::Fetch => "fetch failed",
            Self::Insert => "insert failed",
        }
    }
}

impl fmt::Display for LookupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// The main error type for lexis-core operations.
///
/// All public functions in lexis-core return `Result<T, Error>`. The error
/// keeps its source chain, so `Debug` output shows the underlying
/// `reqwest`/`rusqlite` failure while `Display` stays short.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// The dictionary host could not be reached or the response body could
    /// not be read. The underlying `reqwest::Error` is preserved.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The dictionary host answered with a non-success status.
    #[error("Request to '{url}' failed with HTTP {status}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP status code returned by the server.
        status: u16,
    },

    /// Requested resource was not found.
    ///
    /// Used when the dictionary has no page for a word (HTTP 404) and when a
    /// favorite references an entry that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Parsing operation failed.
    ///
    /// Only raised while compiling the extraction selectors; missing markup in
    /// a fetched page is never an error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Entry store operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL is malformed or invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A request was rejected before reaching the lookup pipeline.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A lookup failed at a specific pipeline stage.
    ///
    /// `Display` renders as `"<stage marker>: <source>"`, for example
    /// `"insert failed: Storage error: database is locked"`.
    #[error("{stage}: {source}")]
    Lookup {
        /// Stage that failed.
        stage: LookupStage,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<tokio_rusqlite::Error> for Error {
    fn from(err: tokio_rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl Error {
    /// Wrap an error with the lookup stage it occurred in.
    #[must_use]
    pub fn at_stage(self, stage: LookupStage) -> Self {
        Self::Lookup {
            stage,
            source: Box::new(self),
        }
    }

    /// The lookup stage this error was raised in, if it came out of the pipeline.
    #[must_use]
    pub const fn stage(&self) -> Option<LookupStage> {
        match self {
            Self::Lookup { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Check if the error might be recoverable through retry logic.
    ///
    /// The pipeline itself never retries; this is a hint for callers.
    /// Connection failures, timeouts and 5xx responses are considered
    /// transient. Stage wrappers defer to the wrapped error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            Self::Lookup { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }

    /// Get the error category as a string identifier for logging.
    ///
    /// Stage wrappers report the category of the wrapped error.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) | Self::Http { .. } => "network",
            Self::NotFound(_) => "not_found",
            Self::Parse(_) => "parse",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::InvalidUrl(_) => "invalid_url",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Serialization(_) => "serialization",
            Self::Lookup { source, .. } => source.category(),
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
