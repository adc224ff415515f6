//! Errors the comment relay reports to its transport.

use thiserror::Error;

use crate::authorization::{PolicyError, RequestError};
use crate::github::{CommentId, GitHubError};
use crate::identity::{AuthenticationError, AuthenticationFailure, KeyDiscoveryError};

/// Terminal failures of a comment request. None are retried internally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The credential was missing or could not be verified.
    ///
    /// The message never says which check failed.
    #[error(transparent)]
    Unauthenticated(#[from] AuthenticationError),

    /// The identity may not write to the requested pull request.
    #[error("authorization denied: {reason}")]
    AuthorizationDenied {
        /// Which check failed.
        reason: String,
    },

    /// The request itself is malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// No existing comment contains the requested tag.
    #[error("no comment found with tag {tag}")]
    NotFound {
        /// Tag that was searched for.
        tag: String,
    },

    /// The tagged comment was written by someone other than the bot.
    #[error("refusing to update comment {comment_id} created by another user")]
    RefusedUpdate {
        /// Comment that matched the tag.
        comment_id: CommentId,
    },

    /// The service was configured with an invalid policy.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] PolicyError),

    /// Workload identity signing keys could not be loaded.
    #[error("signing key discovery failed: {0}")]
    KeyDiscovery(#[from] KeyDiscoveryError),

    /// The request deadline passed before the comment was written.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// GitHub could not be read or written.
    #[error(transparent)]
    Upstream(#[from] GitHubError),
}

impl ServiceError {
    /// Short, stable label for telemetry.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::AuthorizationDenied { .. } => "authorization_denied",
            Self::InvalidRequest(_) => "invalid_request",
            Self::NotFound { .. } => "not_found",
            Self::RefusedUpdate { .. } => "refused_update",
            Self::Configuration(_) => "configuration",
            Self::KeyDiscovery(_) => "key_discovery",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Upstream(_) => "upstream",
        }
    }
}

impl From<AuthenticationFailure> for ServiceError {
    fn from(failure: AuthenticationFailure) -> Self {
        Self::Unauthenticated(failure.into())
    }
}
