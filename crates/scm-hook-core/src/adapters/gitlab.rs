//! GitLab-backed [`ScmClient`].

use crate::{RequestContext, ScmClient, ScmError};
use async_trait::async_trait;
use bytes::Bytes;
use gitlab_client::{ApiError, GitLabClient};
use tracing::debug;

#[async_trait]
impl ScmClient for GitLabClient {
    async fn get_remote_config(
        &self,
        ctx: &RequestContext,
        file_path: &str,
        commit_sha: &str,
    ) -> Result<Option<Bytes>, ScmError> {
        let file = self
            .get_raw_file(ctx.project_id(), file_path, commit_sha)
            .await
            .map_err(|e| map_api_error(ctx, e))?;

        if file.is_none() {
            debug!(file_path = %file_path, "No configuration file at commit");
        }

        Ok(file)
    }
}

fn map_api_error(ctx: &RequestContext, error: ApiError) -> ScmError {
    match error {
        ApiError::AuthenticationFailed => ScmError::AuthenticationFailed,
        ApiError::AuthorizationFailed => ScmError::AccessDenied {
            project: ctx.project_id().to_string(),
        },
        other => ScmError::RequestFailed {
            transient: other.is_transient(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
#[path = "gitlab_tests.rs"]
mod tests;
