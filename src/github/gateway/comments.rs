//! Octocrab implementation of the pull request comment store.

use async_trait::async_trait;
use octocrab::{Octocrab, Page};

use crate::github::coordinates::{CommentId, PullRequestNumber, RepositoryCoordinates};
use crate::github::error::GitHubError;
use crate::github::models::{ApiComment, ApiCommentBody, IssueComment};

use super::CommentStore;
use super::client::{DEFAULT_API_BASE, GitHubCredentials, build_octocrab_client};
use super::error_mapping::map_octocrab_error;

/// Octocrab-backed comment store acting as the bot identity.
pub struct OctocrabCommentStore {
    client: Octocrab,
}

impl OctocrabCommentStore {
    /// Creates a store from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds a store for the given credentials and API base URL, which
    /// defaults to `https://api.github.com`.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidUrl` when the base URI cannot be parsed or
    /// `GitHubError::Api` when Octocrab fails to construct a client.
    pub fn for_credentials(
        credentials: &GitHubCredentials,
        api_base: Option<&str>,
    ) -> Result<Self, GitHubError> {
        let client = build_octocrab_client(credentials, api_base.unwrap_or(DEFAULT_API_BASE))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl CommentStore for OctocrabCommentStore {
    async fn list_comments(
        &self,
        repository: &RepositoryCoordinates,
        number: PullRequestNumber,
    ) -> Result<Vec<IssueComment>, GitHubError> {
        let query_params = [("sort", "updated"), ("direction", "desc")];

        let page = self
            .client
            .get::<Page<ApiComment>, _, _>(repository.comments_path(number), Some(&query_params))
            .await
            .map_err(|error| map_octocrab_error("issue comments", &error))?;

        self.client
            .all_pages(page)
            .await
            .map(|comments| comments.into_iter().map(ApiComment::into).collect())
            .map_err(|error| map_octocrab_error("issue comments", &error))
    }

    async fn create_comment(
        &self,
        repository: &RepositoryCoordinates,
        number: PullRequestNumber,
        body: &str,
    ) -> Result<CommentId, GitHubError> {
        let created: ApiComment = self
            .client
            .post(repository.comments_path(number), Some(&ApiCommentBody { body }))
            .await
            .map_err(|error| map_octocrab_error("create comment", &error))?;

        Ok(CommentId::new(created.id))
    }

    async fn update_comment(
        &self,
        repository: &RepositoryCoordinates,
        comment: CommentId,
        body: &str,
    ) -> Result<CommentId, GitHubError> {
        let updated: ApiComment = self
            .client
            .patch(repository.comment_path(comment), Some(&ApiCommentBody { body }))
            .await
            .map_err(|error| map_octocrab_error("update comment", &error))?;

        Ok(CommentId::new(updated.id))
    }
}
