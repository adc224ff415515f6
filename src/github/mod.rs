//! GitHub collaborators for repository lookups and comment writes.
//!
//! This module wraps Octocrab behind the [`RepositoryDataProvider`] and
//! [`CommentStore`] traits. Errors are mapped into [`GitHubError`] variants so
//! that the authorization engine and comment service can react to precise
//! failures without exposing Octocrab internals.

pub mod coordinates;
pub mod error;
pub mod gateway;
pub mod models;

pub use coordinates::{
    CommentId, PullRequestNumber, RepositoryCoordinates, RepositoryName, RepositoryOwner,
};
pub use error::{CoordinateError, GitHubError};
pub use gateway::{
    CommentStore, GitHubCredentials, OctocrabCommentStore, OctocrabRepositoryProvider,
    RepositoryDataProvider,
};
pub use models::{IssueComment, PullRequestInfo, RepositoryInfo, TokenUser};

#[cfg(test)]
pub use gateway::{MockCommentStore, MockRepositoryDataProvider};
