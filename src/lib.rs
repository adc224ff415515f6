//! ghcp library crate: a GitHub comments proxy.
//!
//! Callers such as CI jobs present a GitHub credential and ask for a comment
//! on a pull request. The relay verifies who the caller is, checks that the
//! identity may write to the target, and then posts or updates the comment as
//! a shared bot account.

pub mod authorization;
pub mod config;
pub mod github;
pub mod identity;
pub mod service;
pub mod telemetry;

pub use authorization::{AuthorizationDecision, AuthorizationEngine, CommentRequest, ServicePolicy};
pub use config::GhcpConfig;
pub use github::GitHubError;
pub use identity::{IdentityContext, IdentityResolver, OidcSignatureVerifier, TokenType};
pub use service::{CommentProxyService, CommentRelay, ServiceError};
