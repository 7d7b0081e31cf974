//! # Configuration Resolution
//!
//! Decides which rule configuration governs a merge request: the file
//! committed at the merge request's last commit, the process-wide global
//! fallback, or nothing yet (deferred to the processor).

use crate::{RequestContext, RuleConfig, ScmClient, ScmError};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of configuration resolution.
#[derive(Debug, Clone)]
pub enum ResolvedConfig {
    /// Parsed from the repository at the pinned commit
    Remote(Arc<RuleConfig>),

    /// Process-wide fallback
    Global(Arc<RuleConfig>),

    /// No usable configuration yet; the processor re-diagnoses
    Deferred { reason: DeferReason },
}

impl ResolvedConfig {
    pub fn config(&self) -> Option<&Arc<RuleConfig>> {
        match self {
            Self::Remote(config) | Self::Global(config) => Some(config),
            Self::Deferred { .. } => None,
        }
    }

    /// Short label for logs
    pub fn source(&self) -> &'static str {
        match self {
            Self::Remote(_) => "remote",
            Self::Global(_) => "global",
            Self::Deferred { .. } => "deferred",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferReason {
    /// No file at the commit and no global fallback configured
    NoConfiguration,

    /// The committed file exists but does not parse or validate
    InvalidRemote { message: String },
}

impl fmt::Display for DeferReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoConfiguration => write!(f, "no configuration file and no global fallback"),
            Self::InvalidRemote { message } => write!(f, "remote configuration invalid: {}", message),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to fetch {path} at {commit_sha}: {source}")]
    FetchFailed {
        path: String,
        commit_sha: String,
        #[source]
        source: ScmError,
    },
}

/// Resolves the effective [`RuleConfig`] for a request.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    config_file_path: String,
    global: Option<Arc<RuleConfig>>,
}

impl ConfigResolver {
    pub fn new(config_file_path: impl Into<String>, global: Option<Arc<RuleConfig>>) -> Self {
        Self {
            config_file_path: config_file_path.into(),
            global,
        }
    }

    /// Resolve the configuration for `ctx`.
    ///
    /// Performs at most one fetch. Only a fetch failure with no global
    /// fallback is an error; every other outcome yields a [`ResolvedConfig`].
    pub async fn resolve(
        &self,
        ctx: &RequestContext,
        client: &dyn ScmClient,
    ) -> Result<ResolvedConfig, ResolveError> {
        let fetched = client
            .get_remote_config(ctx, &self.config_file_path, ctx.commit_sha())
            .await;

        match fetched {
            Err(source) => match &self.global {
                Some(global) => {
                    warn!(
                        error = %source,
                        path = %self.config_file_path,
                        "Fetching remote configuration failed, using global configuration"
                    );
                    Ok(ResolvedConfig::Global(Arc::clone(global)))
                }
                None => Err(ResolveError::FetchFailed {
                    path: self.config_file_path.clone(),
                    commit_sha: ctx.commit_sha().to_string(),
                    source,
                }),
            },

            Ok(Some(bytes)) => match RuleConfig::parse(&bytes) {
                Ok(config) => {
                    info!(path = %self.config_file_path, "Using remote configuration");
                    Ok(ResolvedConfig::Remote(Arc::new(config)))
                }
                Err(e) => {
                    debug!(
                        error = %e,
                        path = %self.config_file_path,
                        "Remote configuration could not be parsed, deferring"
                    );
                    Ok(ResolvedConfig::Deferred {
                        reason: DeferReason::InvalidRemote {
                            message: e.to_string(),
                        },
                    })
                }
            },

            Ok(None) => match &self.global {
                Some(global) => {
                    debug!(path = %self.config_file_path, "No remote configuration, using global");
                    Ok(ResolvedConfig::Global(Arc::clone(global)))
                }
                None => {
                    debug!(path = %self.config_file_path, "No configuration available, deferring");
                    Ok(ResolvedConfig::Deferred {
                        reason: DeferReason::NoConfiguration,
                    })
                }
            },
        }
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
