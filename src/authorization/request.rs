//! Caller-declared comment targets and their validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::github::{CoordinateError, PullRequestNumber, RepositoryCoordinates};

/// A comment request as it arrives over the wire.
///
/// Every field is untrusted until validated into an
/// [`AuthorizationRequest`] and matched against the caller's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRequest {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Pull request number in decimal.
    pub pr_number: String,
    /// Markdown comment body.
    pub body: String,
    /// Marker identifying a comment to update; empty creates a new comment.
    #[serde(default)]
    pub tag: String,
}

impl CommentRequest {
    /// Creates a request for a new comment.
    #[must_use]
    pub fn new(owner: &str, repo: &str, pr_number: &str, body: &str) -> Self {
        Self {
            owner: owner.to_owned(),
            repo: repo.to_owned(),
            pr_number: pr_number.to_owned(),
            body: body.to_owned(),
            tag: String::new(),
        }
    }

    /// Marks the request as an update of the comment containing `tag`.
    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        tag.clone_into(&mut self.tag);
        self
    }
}

/// Reasons a comment request is malformed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// Owner, repository, or pull request number is invalid.
    #[error(transparent)]
    Coordinates(#[from] CoordinateError),

    /// The comment body is empty.
    #[error("comment body is required")]
    EmptyBody,
}

/// A validated comment target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    repository: RepositoryCoordinates,
    pull_request: PullRequestNumber,
    tag: Option<String>,
    body: String,
}

impl AuthorizationRequest {
    /// Validates a wire request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when the owner or repository is blank, the
    /// pull request number is not a positive integer, or the body is empty.
    pub fn parse(request: &CommentRequest) -> Result<Self, RequestError> {
        let repository = RepositoryCoordinates::parse(&request.owner, &request.repo)?;
        let pull_request = PullRequestNumber::parse(&request.pr_number)?;

        if request.body.trim().is_empty() {
            return Err(RequestError::EmptyBody);
        }

        Ok(Self {
            repository,
            pull_request,
            tag: Some(request.tag.clone()).filter(|tag| !tag.is_empty()),
            body: request.body.clone(),
        })
    }

    /// Target repository.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryCoordinates {
        &self.repository
    }

    /// Target pull request.
    #[must_use]
    pub const fn pull_request(&self) -> PullRequestNumber {
        self.pull_request
    }

    /// Update marker, when the caller wants to replace an existing comment.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Comment body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl TryFrom<&CommentRequest> for AuthorizationRequest {
    type Error = RequestError;

    fn try_from(request: &CommentRequest) -> Result<Self, Self::Error> {
        Self::parse(request)
    }
}
