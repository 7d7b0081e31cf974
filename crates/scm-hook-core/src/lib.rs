//! # scm-hook Core
//!
//! Domain logic for the scm-hook merge request webhook pipeline.
//!
//! This crate knows how to authenticate a delivery, decode and route a GitLab
//! merge request or note event, build the per-request correlation context,
//! resolve the effective rule configuration and hand the event to a
//! processor. It has no HTTP server code; `scm-hook-api` drives it.
//!
//! ## Architecture
//!
//! - The hosting platform sits behind the [`ScmClient`] trait
//! - The rule engine sits behind the [`MergeRequestProcessor`] trait
//! - Everything downstream of routing receives an immutable [`RequestContext`]
//!
//! ## Usage
//!
//! ```rust
//! use scm_hook_core::{RequestContext, WebhookEnvelope};
//!
//! let body = br#"{
//!     "event_type": "merge_request",
//!     "project": { "path_with_namespace": "group/project" },
//!     "object_attributes": { "iid": 7, "last_commit": { "id": "abc123" } }
//! }"#;
//!
//! let envelope = WebhookEnvelope::from_slice(body).unwrap();
//! let target = envelope.target().unwrap();
//! let project = envelope.project().unwrap();
//! let ctx = RequestContext::enrich(&project.path_with_namespace, target);
//!
//! assert_eq!(ctx.merge_request_id(), 7);
//! assert_eq!(ctx.commit_sha(), "abc123");
//! ```

pub mod adapters;
pub mod context;
pub mod processor;
pub mod resolver;
pub mod rule_config;
pub mod scm;
pub mod webhook;

pub use context::RequestContext;
pub use processor::{ConfigCheckProcessor, MergeRequestProcessor, ProcessingError};
pub use resolver::{ConfigResolver, DeferReason, ResolveError, ResolvedConfig};
pub use rule_config::{RuleConfig, RuleConfigError};
pub use scm::{ScmClient, ScmError};
pub use webhook::{
    auth::{AuthError, AuthGate, GITLAB_TOKEN_HEADER},
    EventKind, EventTarget, RouteError, WebhookEnvelope,
};
