//! Shared-secret authentication for GitLab webhook deliveries.
//!
//! GitLab sends the secret configured on the webhook verbatim in the
//! `X-Gitlab-Token` header. There is no payload signature to verify.

use std::fmt;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Header carrying the webhook secret token
pub const GITLAB_TOKEN_HEADER: &str = "X-Gitlab-Token";

/// Compares the configured webhook secret against the presented token.
///
/// An empty secret puts the gate in open mode: every delivery passes. The
/// service logs a warning at startup when that is the case.
#[derive(Clone)]
pub struct AuthGate {
    secret: Arc<str>,
}

impl AuthGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Arc::from(secret.into()),
        }
    }

    /// `true` when no secret is configured
    pub fn is_open(&self) -> bool {
        self.secret.is_empty()
    }

    /// Check the raw header bytes presented in `X-Gitlab-Token`.
    ///
    /// The comparison is an exact byte match done in constant time; header
    /// bytes are not required to be visible ASCII.
    ///
    /// # Errors
    ///
    /// `AuthError::InvalidToken` when a secret is configured and the header
    /// is missing or differs.
    pub fn check(&self, presented: Option<&[u8]>) -> Result<(), AuthError> {
        if self.is_open() {
            return Ok(());
        }

        let presented = presented.ok_or(AuthError::InvalidToken)?;
        if bool::from(self.secret.as_bytes().ct_eq(presented)) {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

impl fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate")
            .field("open", &self.is_open())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing or invalid X-Gitlab-Token header")]
    InvalidToken,
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
