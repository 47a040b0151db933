//! Error types for repolens-core

use thiserror::Error;

/// Result type alias using repolens-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Faults that abort a connector invocation or a curation run.
///
/// Transport failures are not represented here: the HTTP layer turns them
/// into a sentinel response, which then surfaces as [`Error::HttpStatus`].
#[derive(Error, Debug)]
pub enum Error {
    /// A required request returned a non-2xx status (or the transport sentinel)
    #[error("Request to {url} failed with HTTP status {status}")]
    HttpStatus { status: u16, url: String },

    /// The backend answered with JSON of an unexpected shape
    #[error("Unexpected response payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// A configured regular expression does not compile
    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The configured query mode is not one of the supported modes
    #[error("Unknown query mode: '{mode}'. Valid modes: path, version, repository, test")]
    UnknownQueryMode { mode: String },

    /// Any other configuration problem detected while building a query
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl Error {
    /// Create an HTTP status error
    pub fn http_status(status: u16, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    /// Create an invalid regex error
    pub fn invalid_regex(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidRegex {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create an unknown query mode error
    pub fn unknown_query_mode(mode: impl Into<String>) -> Self {
        Self::UnknownQueryMode { mode: mode.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// The HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
