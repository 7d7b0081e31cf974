//! # Webhook Module
//!
//! Decoding of GitLab webhook payloads into a closed set of event kinds and
//! extraction of the merge request they refer to.

pub mod auth;

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Event Kinds
// ============================================================================

/// Event kinds handled by the pipeline.
///
/// The set is closed: a new kind needs a new variant, and every `match`
/// over it has to be updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MergeRequest,
    Note,
}

impl EventKind {
    /// Wire name used in the `event_type` payload field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MergeRequest => "merge_request",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merge_request" => Ok(Self::MergeRequest),
            "note" => Ok(Self::Note),
            other => Err(RouteError::UnknownEventType {
                event_type: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// Payload Shapes
// ============================================================================

/// Project identity as sent in every GitLab webhook
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectRef {
    pub path_with_namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LastCommit {
    pub id: String,
}

/// The merge request fields the pipeline needs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeRequestRef {
    pub iid: u64,
    pub last_commit: LastCommit,
}

/// `merge_request` event: the merge request is the primary object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeRequestEvent {
    pub project: ProjectRef,
    pub object_attributes: MergeRequestRef,
}

/// `note` event on a merge request: the merge request is the related object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoteEvent {
    pub project: ProjectRef,
    pub merge_request: MergeRequestRef,
}

/// Discriminator read before the typed decode
#[derive(Debug, Deserialize)]
struct EnvelopeHead {
    event_type: String,
    #[serde(default)]
    project: Option<ProjectRef>,
}

/// Typed view of a webhook body.
///
/// Unknown kinds still decode, with whatever project they carry, so the
/// router can name them when rejecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEnvelope {
    MergeRequest(MergeRequestEvent),
    Note(NoteEvent),
    Unrecognized {
        event_type: String,
        project: Option<ProjectRef>,
    },
}

impl WebhookEnvelope {
    /// Strictly decode a webhook body.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON, a missing
    /// `event_type`, or a known kind whose project or nested objects do not
    /// match the expected shape.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let head: EnvelopeHead = serde_json::from_slice(body)?;

        match head.event_type.parse::<EventKind>() {
            Ok(EventKind::MergeRequest) => Ok(Self::MergeRequest(serde_json::from_slice(body)?)),
            Ok(EventKind::Note) => Ok(Self::Note(serde_json::from_slice(body)?)),
            Err(_) => Ok(Self::Unrecognized {
                event_type: head.event_type,
                project: head.project,
            }),
        }
    }

    /// Project the event belongs to; always present for known kinds
    pub fn project(&self) -> Option<&ProjectRef> {
        match self {
            Self::MergeRequest(event) => Some(&event.project),
            Self::Note(event) => Some(&event.project),
            Self::Unrecognized { project, .. } => project.as_ref(),
        }
    }

    /// Raw `event_type` value
    pub fn event_type(&self) -> &str {
        match self {
            Self::MergeRequest(_) => EventKind::MergeRequest.as_str(),
            Self::Note(_) => EventKind::Note.as_str(),
            Self::Unrecognized { event_type, .. } => event_type,
        }
    }

    /// Resolve the merge request and commit this event is about.
    ///
    /// # Errors
    ///
    /// `RouteError::UnknownEventType` for any kind outside [`EventKind`].
    pub fn target(&self) -> Result<EventTarget, RouteError> {
        match self {
            Self::MergeRequest(event) => Ok(EventTarget::new(
                EventKind::MergeRequest,
                &event.object_attributes,
            )),
            Self::Note(event) => Ok(EventTarget::new(EventKind::Note, &event.merge_request)),
            Self::Unrecognized { event_type, .. } => Err(RouteError::UnknownEventType {
                event_type: event_type.clone(),
            }),
        }
    }
}

/// Output of event routing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTarget {
    pub kind: EventKind,
    pub merge_request_iid: u64,
    pub commit_sha: String,
}

impl EventTarget {
    fn new(kind: EventKind, merge_request: &MergeRequestRef) -> Self {
        Self {
            kind,
            merge_request_iid: merge_request.iid,
            commit_sha: merge_request.last_commit.id.clone(),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("unknown event type: {event_type}")]
    UnknownEventType { event_type: String },
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
