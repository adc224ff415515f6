//! Error types exposed by the GitHub collaborator layer.

use thiserror::Error;

/// Errors surfaced while communicating with GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitHubError {
    /// GitHub rejected the credential used for the call.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// The requested repository, pull request, comment, or file does not exist
    /// or is not visible to the credential.
    #[error("GitHub resource not found: {message}")]
    NotFound {
        /// Operation and response detail.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// Rate limit exceeded - the API returned 403/429 with a rate limit message.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Error message from GitHub.
        message: String,
    },

    /// The configured API base URL could not be parsed.
    #[error("GitHub API URL is invalid: {0}")]
    InvalidUrl(String),

    /// A response body could not be decoded into the expected shape.
    #[error("failed to decode GitHub response: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },
}

/// Errors raised while validating repository coordinates supplied by a caller.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CoordinateError {
    /// The repository owner was blank.
    #[error("repository owner is required")]
    MissingOwner,

    /// The repository owner contains characters GitHub does not allow.
    #[error("repository owner is not a valid GitHub name")]
    InvalidOwner,

    /// The repository name was blank.
    #[error("repository name is required")]
    MissingRepository,

    /// The repository name contains characters GitHub does not allow.
    #[error("repository name is not a valid GitHub name")]
    InvalidRepository,

    /// The pull request number is not a positive integer.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,
}
