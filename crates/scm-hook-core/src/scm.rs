//! Hosting platform abstraction.

use crate::RequestContext;
use async_trait::async_trait;
use bytes::Bytes;

/// Read access to the hosting platform.
///
/// One implementation is constructed at startup and shared by every request
/// as `Arc<dyn ScmClient>`, so implementations must be safe for concurrent
/// calls without external locking.
#[async_trait]
pub trait ScmClient: Send + Sync {
    /// Fetch `file_path` from the context's project at `commit_sha`.
    ///
    /// Returns `Ok(None)` when the file does not exist at that commit.
    async fn get_remote_config(
        &self,
        ctx: &RequestContext,
        file_path: &str,
        commit_sha: &str,
    ) -> Result<Option<Bytes>, ScmError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ScmError {
    #[error("authentication with the hosting platform failed")]
    AuthenticationFailed,

    #[error("access to project {project} was denied")]
    AccessDenied { project: String },

    #[error("hosting platform request failed: {message}")]
    RequestFailed { message: String, transient: bool },
}

impl ScmError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::AuthenticationFailed => false,
            Self::AccessDenied { .. } => false,
            Self::RequestFailed { transient, .. } => *transient,
        }
    }
}
