//! Error types for GitLab API operations.

use thiserror::Error;

/// Errors that can occur during GitLab API operations.
#[derive(Debug, Error)]
pub enum GitlabError {
    /// Configuration is missing or incomplete.
    #[error("GitLab configuration required: {0}")]
    ConfigMissing(String),

    /// The base host could not be parsed into a usable URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A caller-supplied argument was rejected before any request was sent.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// HTTP transport error (connect, DNS, TLS, body read).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a status code of 400 or above.
    #[error("GitLab API error: {url} ({status}): {body}")]
    Server {
        status: u16,
        url: String,
        /// Response body with surrounding whitespace trimmed.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("Cannot unmarshal json: {body}")]
    JsonFormat {
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GitlabError {
    /// The HTTP status code carried by a server error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The HTTP status code, or `default` for errors that carry none.
    pub fn status_code_or(&self, default: u16) -> u16 {
        self.status_code().unwrap_or(default)
    }

    /// The trimmed response body carried by a server error.
    pub fn error_body(&self) -> Option<&str> {
        match self {
            Self::Server { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns true for a 404 from the server.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    pub(crate) fn invalid_url(url: &str, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for GitLab operations.
pub type Result<T> = core::result::Result<T, GitlabError>;
