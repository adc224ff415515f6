//! Collaborators for reading repository state and writing comments.
//!
//! The authorization engine and the comment service only see the
//! [`RepositoryDataProvider`] and [`CommentStore`] traits. The trait-based
//! design enables mocking in tests while the Octocrab implementations handle
//! real HTTP requests.

mod client;
mod comments;
mod error_mapping;
mod repository;

pub use client::GitHubCredentials;
pub use comments::OctocrabCommentStore;
pub use repository::OctocrabRepositoryProvider;

use async_trait::async_trait;

use crate::github::coordinates::{CommentId, PullRequestNumber, RepositoryCoordinates};
use crate::github::error::GitHubError;
use crate::github::models::{IssueComment, PullRequestInfo, RepositoryInfo, TokenUser};

/// Read access to authoritative repository state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryDataProvider: Send + Sync {
    /// Resolve the user that owns `token` ("who am I").
    async fn identity(&self, token: &str) -> Result<TokenUser, GitHubError>;

    /// Fetch repository attributes such as visibility.
    async fn repository(
        &self,
        repository: &RepositoryCoordinates,
    ) -> Result<RepositoryInfo, GitHubError>;

    /// Fetch pull request attributes such as state.
    async fn pull_request(
        &self,
        repository: &RepositoryCoordinates,
        number: PullRequestNumber,
    ) -> Result<PullRequestInfo, GitHubError>;

    /// Fetch the raw content of a file on the default branch.
    async fn file_content(
        &self,
        repository: &RepositoryCoordinates,
        path: &str,
    ) -> Result<Vec<u8>, GitHubError>;
}

/// Pull request comment storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// List issue comments on the pull request, most recently updated first.
    async fn list_comments(
        &self,
        repository: &RepositoryCoordinates,
        number: PullRequestNumber,
    ) -> Result<Vec<IssueComment>, GitHubError>;

    /// Create a new comment and return its identifier.
    async fn create_comment(
        &self,
        repository: &RepositoryCoordinates,
        number: PullRequestNumber,
        body: &str,
    ) -> Result<CommentId, GitHubError>;

    /// Replace the body of an existing comment and return its identifier.
    async fn update_comment(
        &self,
        repository: &RepositoryCoordinates,
        comment: CommentId,
        body: &str,
    ) -> Result<CommentId, GitHubError>;
}
