//! Error types for the HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scm_hook_core::{AuthError, ProcessingError, ResolveError, RouteError};
use tracing::{error, warn};

/// Webhook handler errors with HTTP status code mapping
///
/// Two tiers:
///
/// - **Protocol**: the delivery itself is unacceptable. Answered with a
///   4xx/5xx status and nothing downstream runs. Logged here, when the
///   response is built.
/// - **Business**: the delivery was fine but the work failed. Answered with
///   `200 OK` and the error text so GitLab does not retry or disable the
///   hook. Logged by the handler inside the request span.
///
/// Bodies are plain text.
#[derive(Debug, thiserror::Error)]
pub enum WebhookHandlerError {
    /// Maps to: `403 Forbidden`
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// Maps to: `406 Not Acceptable`
    #[error("The request is not using Content-Type: application/json")]
    UnsupportedContentType,

    /// Maps to: `400 Bad Request`
    #[error("could not read POST body: {message}")]
    UnreadableBody { message: String },

    /// Maps to: `400 Bad Request`
    #[error("The POST body is empty; expected a JSON payload")]
    EmptyBody,

    /// Malformed JSON or a known event kind with the wrong shape
    ///
    /// Maps to: `400 Bad Request`
    #[error("could not decode POST body into Payload struct: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    /// Maps to: `500 Internal Server Error`
    #[error(transparent)]
    UnroutableEvent(#[from] RouteError),

    /// The untyped re-decode failed after the typed decode succeeded
    ///
    /// Maps to: `500 Internal Server Error`
    #[error("could not decode POST body: {0}")]
    UntypedPayload(#[source] serde_json::Error),

    /// Maps to: `200 OK` (business tier)
    #[error(transparent)]
    ConfigUnavailable(#[from] ResolveError),

    /// Maps to: `200 OK` (business tier)
    #[error(transparent)]
    ProcessingFailed(#[from] ProcessingError),
}

impl WebhookHandlerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::FORBIDDEN,
            Self::UnsupportedContentType => StatusCode::NOT_ACCEPTABLE,
            Self::UnreadableBody { .. } | Self::EmptyBody | Self::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::UnroutableEvent(_) | Self::UntypedPayload(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::ConfigUnavailable(_) | Self::ProcessingFailed(_) => StatusCode::OK,
        }
    }

    /// `true` for failures answered with `200 OK`
    pub fn is_business_tier(&self) -> bool {
        self.status_code() == StatusCode::OK
    }
}

impl IntoResponse for WebhookHandlerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "Webhook rejected");
        } else if status.is_client_error() {
            warn!(status = status.as_u16(), error = %message, "Webhook rejected");
        }

        (status, message).into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
