//! # Processing Stage
//!
//! The rule engine sits behind [`MergeRequestProcessor`]. The pipeline hands
//! it the request context, the shared hosting client, the resolved
//! configuration and the untyped payload.

use crate::{RequestContext, ResolvedConfig, RuleConfig, RuleConfigError, ScmClient, ScmError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Evaluates rules against a merge request.
#[async_trait]
pub trait MergeRequestProcessor: Send + Sync {
    async fn process(
        &self,
        ctx: &RequestContext,
        client: Arc<dyn ScmClient>,
        config: ResolvedConfig,
        payload: Value,
    ) -> Result<(), ProcessingError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("configuration file {path} not found and no global configuration is set")]
    ConfigMissing { path: String },

    #[error("configuration file {path} is invalid: {source}")]
    InvalidConfig {
        path: String,
        #[source]
        source: RuleConfigError,
    },

    #[error(transparent)]
    Scm(#[from] ScmError),

    #[error("processing failed: {message}")]
    Failed { message: String },
}

/// Processor that checks configuration and reports what it would apply.
///
/// Turns a deferred resolution into a concrete error by fetching the file
/// again. Never changes the merge request.
#[derive(Debug, Clone)]
pub struct ConfigCheckProcessor {
    config_file_path: String,
}

impl ConfigCheckProcessor {
    pub fn new(config_file_path: impl Into<String>) -> Self {
        Self {
            config_file_path: config_file_path.into(),
        }
    }

    async fn diagnose(
        &self,
        ctx: &RequestContext,
        client: &dyn ScmClient,
    ) -> Result<RuleConfig, ProcessingError> {
        let bytes = client
            .get_remote_config(ctx, &self.config_file_path, ctx.commit_sha())
            .await?
            .ok_or_else(|| ProcessingError::ConfigMissing {
                path: self.config_file_path.clone(),
            })?;

        RuleConfig::parse(&bytes).map_err(|source| ProcessingError::InvalidConfig {
            path: self.config_file_path.clone(),
            source,
        })
    }
}

#[async_trait]
impl MergeRequestProcessor for ConfigCheckProcessor {
    async fn process(
        &self,
        ctx: &RequestContext,
        client: Arc<dyn ScmClient>,
        config: ResolvedConfig,
        payload: Value,
    ) -> Result<(), ProcessingError> {
        let source = config.source();
        let rules = match config {
            ResolvedConfig::Remote(rules) | ResolvedConfig::Global(rules) => rules,
            ResolvedConfig::Deferred { .. } => {
                // The file may have appeared or been fixed since resolution;
                // only an actual failure is reported.
                Arc::new(self.diagnose(ctx, client.as_ref()).await?)
            }
        };

        let action = payload
            .pointer("/object_attributes/action")
            .and_then(Value::as_str)
            .unwrap_or("none");

        info!(
            config_source = source,
            labels = rules.labels.len(),
            actions = rules.actions.len(),
            dry_run = rules.dry_run,
            action = action,
            "Merge request configuration checked"
        );

        Ok(())
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
