//! Per-request correlation context.

use crate::webhook::{EventKind, EventTarget};
use tracing::Span;

/// Correlation fields for one webhook delivery.
///
/// Built once, after routing, and passed by reference to every downstream
/// call. Fields are private so nothing past construction can change them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    project_id: String,
    merge_request_id: u64,
    commit_sha: String,
    event_kind: EventKind,
}

impl RequestContext {
    /// Fold the project identity and the routed event into a context.
    pub fn enrich(project_id: impl Into<String>, target: EventTarget) -> Self {
        Self {
            project_id: project_id.into(),
            merge_request_id: target.merge_request_iid,
            commit_sha: target.commit_sha,
            event_kind: target.kind,
        }
    }

    /// Project `path_with_namespace`
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Merge request IID within the project
    pub fn merge_request_id(&self) -> u64 {
        self.merge_request_id
    }

    /// Last commit of the merge request; pins configuration lookups
    pub fn commit_sha(&self) -> &str {
        &self.commit_sha
    }

    pub fn event_kind(&self) -> EventKind {
        self.event_kind
    }

    /// Span carrying the correlation fields.
    ///
    /// Instrument the rest of the request with it so every log record has
    /// the project, merge request, commit and event type attached.
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "webhook",
            project = %self.project_id,
            merge_request_id = self.merge_request_id,
            commit_sha = %self.commit_sha,
            event_type = %self.event_kind,
        )
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
