//! Repository file operations.

use bytes::Bytes;
use tracing::debug;

use super::GitLabClient;
use crate::error::ApiError;

impl GitLabClient {
    /// Fetch the raw content of a repository file at a given ref.
    ///
    /// `project` is the project's `path_with_namespace` (or numeric ID) and
    /// `git_ref` is a commit SHA, branch or tag.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(bytes))` - the file exists at `git_ref`
    /// * `Ok(None)` - GitLab answered 404: no such file at that ref
    ///
    /// # Errors
    ///
    /// * `ApiError::AuthenticationFailed` - token rejected (401)
    /// * `ApiError::AuthorizationFailed` - insufficient permissions (403)
    /// * `ApiError::HttpError` - any other non-success status
    /// * `ApiError::HttpClientError` - transport failure
    pub async fn get_raw_file(
        &self,
        project: &str,
        file_path: &str,
        git_ref: &str,
    ) -> Result<Option<Bytes>, ApiError> {
        let url = format!(
            "{}/projects/{}/repository/files/{}/raw?ref={}",
            self.base_url(),
            urlencoding::encode(project),
            urlencoding::encode(file_path),
            urlencoding::encode(git_ref),
        );

        debug!(project = %project, file_path = %file_path, git_ref = %git_ref, "Fetching raw repository file");

        let response = self.http_client().get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return match status.as_u16() {
                404 => Ok(None),
                401 => Err(ApiError::AuthenticationFailed),
                403 => Err(ApiError::AuthorizationFailed),
                _ => {
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    Err(ApiError::HttpError {
                        status: status.as_u16(),
                        message,
                    })
                }
            };
        }

        Ok(Some(response.bytes().await?))
    }
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;
