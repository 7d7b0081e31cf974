//! Configuration types for the HTTP service

use crate::errors::ConfigError;
use gitlab_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Path reserved for the status endpoint
pub const STATUS_PATH: &str = "/_status";

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Webhook endpoint settings
    pub webhooks: WebhookConfig,

    /// GitLab API access
    pub gitlab: GitLabConfig,

    /// Rule configuration lookup
    pub rules: RulesConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Check the configuration for values the service cannot run with.
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                message: "server.port must be non-zero".to_string(),
            });
        }

        let endpoint = &self.webhooks.endpoint_path;
        if endpoint.is_empty() {
            return Err(ConfigError::Invalid {
                message: "webhooks.endpoint_path must not be empty".to_string(),
            });
        }
        if !endpoint.starts_with('/') {
            return Err(ConfigError::Invalid {
                message: format!("webhooks.endpoint_path '{}' must start with '/'", endpoint),
            });
        }
        if endpoint == STATUS_PATH {
            return Err(ConfigError::Invalid {
                message: format!("webhooks.endpoint_path must not be {}", STATUS_PATH),
            });
        }

        if self.gitlab.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "gitlab.base_url must not be empty".to_string(),
            });
        }

        if self.rules.config_file_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "rules.config_file_path must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

/// Webhook endpoint configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Webhook endpoint path
    pub endpoint_path: String,

    /// Expected `X-Gitlab-Token` value; empty accepts every delivery
    pub secret: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            endpoint_path: "/gitlab".to_string(),
            secret: String::new(),
        }
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("endpoint_path", &self.endpoint_path)
            .field("secret", &redact(&self.secret))
            .finish()
    }
}

/// GitLab API configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitLabConfig {
    /// API base URL, including `/api/v4`
    pub base_url: String,

    /// Access token sent as `PRIVATE-TOKEN`
    pub token: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    pub user_agent: String,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            base_url: client.base_url,
            token: String::new(),
            timeout_seconds: client.timeout.as_secs(),
            user_agent: client.user_agent,
        }
    }
}

impl GitLabConfig {
    /// Client settings derived from this section
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_seconds))
            .with_user_agent(self.user_agent.clone())
    }
}

impl fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabConfig")
            .field("base_url", &self.base_url)
            .field("token", &redact(&self.token))
            .field("timeout_seconds", &self.timeout_seconds)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Rule configuration lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Path of the rule file inside each repository
    pub config_file_path: String,

    /// Local fallback used when a repository has no rule file
    pub global_config_file_path: Option<PathBuf>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            config_file_path: ".scm-engine.yml".to_string(),
            global_config_file_path: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<empty>"
    } else {
        "<REDACTED>"
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
