//! Error types for GitLab API operations.

use thiserror::Error;

/// Errors during GitLab API operations.
///
/// These errors represent failures when constructing the client or when
/// communicating with the GitLab REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client could not be constructed from the supplied settings.
    #[error("Invalid client configuration: {message}")]
    InvalidConfiguration { message: String },

    /// HTTP error response from GitLab API.
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    /// The access token was rejected.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The access token lacks permission for the resource.
    #[error("Authorization failed")]
    AuthorizationFailed,

    /// HTTP client error (network, TLS, timeout, etc.).
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

impl ApiError {
    /// Check if this error represents a transient condition that may succeed if retried.
    ///
    /// Nothing in this crate retries; callers use this for logging and
    /// classification only.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::InvalidConfiguration { .. } => false,
            Self::HttpError { status, .. } => *status >= 500 || *status == 429,
            Self::AuthenticationFailed => false,
            Self::AuthorizationFailed => false,
            Self::HttpClientError(_) => true,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
