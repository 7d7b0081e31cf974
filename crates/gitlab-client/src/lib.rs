//! # GitLab Client
//!
//! Minimal GitLab REST API client used by scm-hook.
//!
//! The client is constructed once with a fallible builder and then shared
//! across concurrent requests. It currently exposes the repository-file read
//! needed to pin rule configuration to a specific commit.

pub mod client;
pub mod error;

pub use client::{ClientConfig, GitLabClient, GitLabClientBuilder};
pub use error::ApiError;
