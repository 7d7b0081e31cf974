//! Tests for the configuration check processor.

use super::*;
use crate::resolver::DeferReason;
use crate::webhook::{EventKind, EventTarget};
use bytes::Bytes;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

struct FixedClient {
    reply: fn() -> Result<Option<Bytes>, ScmError>,
    calls: AtomicUsize,
}

impl FixedClient {
    fn new(reply: fn() -> Result<Option<Bytes>, ScmError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ScmClient for FixedClient {
    async fn get_remote_config(
        &self,
        _ctx: &RequestContext,
        _file_path: &str,
        _commit_sha: &str,
    ) -> Result<Option<Bytes>, ScmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply)()
    }
}

fn test_context() -> RequestContext {
    RequestContext::enrich(
        "group/project",
        EventTarget {
            kind: EventKind::Note,
            merge_request_iid: 5,
            commit_sha: "feed".to_string(),
        },
    )
}

fn deferred() -> ResolvedConfig {
    ResolvedConfig::Deferred {
        reason: DeferReason::NoConfiguration,
    }
}

#[tokio::test]
async fn test_resolved_config_is_accepted_without_fetching() {
    let client = FixedClient::new(|| Ok(None));
    let processor = ConfigCheckProcessor::new(".scm-engine.yml");

    let result = processor
        .process(
            &test_context(),
            client.clone(),
            ResolvedConfig::Global(Arc::new(RuleConfig::default())),
            json!({ "object_attributes": { "action": "open" } }),
        )
        .await;

    assert!(result.is_ok());
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_deferred_with_missing_file_reports_config_missing() {
    let client = FixedClient::new(|| Ok(None));
    let processor = ConfigCheckProcessor::new(".scm-engine.yml");

    let error = processor
        .process(&test_context(), client.clone(), deferred(), json!({}))
        .await
        .unwrap_err();

    assert!(matches!(error, ProcessingError::ConfigMissing { ref path } if path == ".scm-engine.yml"));
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_deferred_with_invalid_file_reports_invalid_config() {
    let client = FixedClient::new(|| Ok(Some(Bytes::from_static(b"label: [unclosed"))));
    let processor = ConfigCheckProcessor::new(".scm-engine.yml");

    let error = processor
        .process(&test_context(), client, deferred(), json!({}))
        .await
        .unwrap_err();

    assert!(matches!(error, ProcessingError::InvalidConfig { .. }));
    assert!(error.to_string().contains(".scm-engine.yml"));
}

#[tokio::test]
async fn test_deferred_with_fetch_failure_reports_scm_error() {
    let client = FixedClient::new(|| Err(ScmError::AuthenticationFailed));
    let processor = ConfigCheckProcessor::new(".scm-engine.yml");

    let error = processor
        .process(&test_context(), client, deferred(), json!({}))
        .await
        .unwrap_err();

    assert!(matches!(error, ProcessingError::Scm(ScmError::AuthenticationFailed)));
}

#[tokio::test]
async fn test_deferred_with_file_now_valid_succeeds() {
    let client = FixedClient::new(|| Ok(Some(Bytes::from_static(b"label:\n  - name: bug\n"))));
    let processor = ConfigCheckProcessor::new(".scm-engine.yml");

    let result = processor
        .process(&test_context(), client, deferred(), json!({}))
        .await;

    assert!(result.is_ok());
}
