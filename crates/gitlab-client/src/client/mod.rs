//! GitLab API client.
//!
//! This module provides the `GitLabClient` used by scm-hook to read
//! repository content from GitLab. One client is built at process start and
//! shared by every request; the underlying `reqwest::Client` pools
//! connections and is safe for concurrent use.

mod files;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::error::ApiError;

/// Header carrying a GitLab personal, project or group access token.
pub const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Configuration for GitLab API client behavior.
///
/// # Examples
///
/// ```
/// use gitlab_client::client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_base_url("https://gitlab.example.com/api/v4")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string for API requests
    pub user_agent: String,
    /// Request timeout duration
    pub timeout: Duration,
    /// GitLab API base URL, including the `/api/v4` suffix
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "scm-hook/0.1.0".to_string(),
            timeout: Duration::from_secs(30),
            base_url: "https://gitlab.com/api/v4".to_string(),
        }
    }
}

impl ClientConfig {
    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the GitLab API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// GitLab API client authenticated with an access token.
///
/// # Examples
///
/// ```no_run
/// # use gitlab_client::client::{ClientConfig, GitLabClient};
/// # fn example() -> Result<(), gitlab_client::ApiError> {
/// let client = GitLabClient::builder("glpat-xxxxxxxx")
///     .config(ClientConfig::default())
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GitLabClient {
    http_client: reqwest::Client,
    config: ClientConfig,
    base_url: String,
}

impl std::fmt::Debug for GitLabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

impl GitLabClient {
    /// Create a new builder for constructing a GitLab client.
    pub fn builder(token: impl Into<String>) -> GitLabClientBuilder {
        GitLabClientBuilder::new(token)
    }

    /// Normalized API base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }
}

/// Builder for `GitLabClient`.
///
/// Construction is fallible: a bad token or base URL is reported as
/// `ApiError::InvalidConfiguration` so the caller can refuse to start.
pub struct GitLabClientBuilder {
    token: String,
    config: ClientConfig,
}

impl GitLabClientBuilder {
    fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            config: ClientConfig::default(),
        }
    }

    /// Set the client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// * `ApiError::InvalidConfiguration` - empty or non-ASCII token, or a
    ///   base URL that does not parse as an http(s) URL
    /// * `ApiError::HttpClientError` - the HTTP client could not be created
    pub fn build(self) -> Result<GitLabClient, ApiError> {
        if self.token.trim().is_empty() {
            return Err(ApiError::InvalidConfiguration {
                message: "GitLab access token must not be empty".to_string(),
            });
        }

        let base_url = self.config.base_url.trim_end_matches('/').to_string();
        let parsed =
            reqwest::Url::parse(&base_url).map_err(|e| ApiError::InvalidConfiguration {
                message: format!("invalid GitLab base URL '{}': {}", base_url, e),
            })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ApiError::InvalidConfiguration {
                message: format!("GitLab base URL must use http or https: {}", base_url),
            });
        }

        let mut token_value =
            HeaderValue::from_str(&self.token).map_err(|_| ApiError::InvalidConfiguration {
                message: "GitLab access token contains invalid characters".to_string(),
            })?;
        token_value.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(PRIVATE_TOKEN_HEADER, token_value);

        let http_client = reqwest::Client::builder()
            .user_agent(self.config.user_agent.clone())
            .timeout(self.config.timeout)
            .default_headers(default_headers)
            .build()?;

        Ok(GitLabClient {
            http_client,
            config: self.config,
            base_url,
        })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
