//! Error types for the Phish.net client
//!
//! Every failure the library can produce is one variant of [`Error`].
//! Variants keep their underlying cause as a `source` so callers can walk
//! the chain when rendering diagnostics.

use std::path::PathBuf;

use crate::resource::{QueryableColumn, ResourceKind, ValueKind};

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building requests, talking to the API or
/// persisting the cache
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unsupported resource/style/column combination, or missing client settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A query value does not have the type its column expects
    #[error("Invalid value '{value}' for column '{column}': expected {expected}, got {found}")]
    TypeMismatch {
        column: QueryableColumn,
        expected: ValueKind,
        found: ValueKind,
        value: String,
    },

    /// The request never produced a usable HTTP response, or the server
    /// answered with a non-2xx, non-404 status
    #[error("Request failed: {reason}")]
    Transport {
        status: Option<u16>,
        reason: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The response body is not JSON or not shaped like the API envelope
    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The envelope itself reported an error
    #[error("API error: {}", format_api_error(.message, .code))]
    Api { message: String, code: Option<i64> },

    /// The operation was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,

    /// Serializing, reading or writing a cache file failed
    #[error("Cache error for {resource} ({}): {source}", .path.display())]
    Cache {
        resource: ResourceKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn transport(reason: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            status: source.status().map(|s| s.as_u16()),
            reason: reason.into(),
            source: Some(source),
        }
    }

    /// HTTP status attached to a transport failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Numeric error code reported by the API envelope, if any
    pub fn api_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => *code,
            _ => None,
        }
    }
}

fn format_api_error(message: &str, code: &Option<i64>) -> String {
    match code {
        Some(code) => format!("{} (code {})", message, code),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_code() {
        let err = Error::Api {
            message: "bad key".to_string(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "API error: bad key (code 1)");
        assert_eq!(err.api_code(), Some(1));
    }

    #[test]
    fn test_api_error_display_without_code() {
        let err = Error::Api {
            message: "nope".to_string(),
            code: None,
        };
        assert_eq!(err.to_string(), "API error: nope");
        assert_eq!(err.api_code(), None);
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = Error::TypeMismatch {
            column: QueryableColumn::Uid,
            expected: ValueKind::Integer,
            found: ValueKind::Text,
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value 'abc' for column 'uid': expected integer, got text"
        );
    }
}
