//! Adapters binding core traits to concrete hosting platforms.

pub mod gitlab;
