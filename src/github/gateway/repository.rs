//! Octocrab implementation of the repository data provider.

use async_trait::async_trait;
use octocrab::Octocrab;

use crate::github::coordinates::{PullRequestNumber, RepositoryCoordinates};
use crate::github::error::GitHubError;
use crate::github::models::{
    ApiContent, ApiPullRequest, ApiRepository, ApiUser, PullRequestInfo, RepositoryInfo,
    TokenUser,
};

use super::RepositoryDataProvider;
use super::client::{DEFAULT_API_BASE, GitHubCredentials, build_octocrab_client};
use super::error_mapping::map_octocrab_error;

/// Octocrab-backed repository data provider.
///
/// Repository, pull request, and file lookups use the proxy's own
/// credentials. Identity lookups build a short-lived client carrying the
/// caller's token so that GitHub itself vouches for it.
pub struct OctocrabRepositoryProvider {
    client: Octocrab,
    api_base: String,
}

impl OctocrabRepositoryProvider {
    /// Creates a provider from an Octocrab client and the API base it targets.
    #[must_use]
    pub fn new(client: Octocrab, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
        }
    }

    /// Builds a provider for the given credentials and API base URL, which
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
        let base = api_base.unwrap_or(DEFAULT_API_BASE);
        let client = build_octocrab_client(credentials, base)?;
        Ok(Self::new(client, base))
    }
}

#[async_trait]
impl RepositoryDataProvider for OctocrabRepositoryProvider {
    async fn identity(&self, token: &str) -> Result<TokenUser, GitHubError> {
        let caller =
            build_octocrab_client(&GitHubCredentials::Token(token.to_owned()), &self.api_base)?;

        let user = caller
            .get::<ApiUser, _, _>("/user", None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("token user", &error))?;

        TokenUser::try_from(user)
    }

    async fn repository(
        &self,
        repository: &RepositoryCoordinates,
    ) -> Result<RepositoryInfo, GitHubError> {
        self.client
            .get::<ApiRepository, _, _>(repository.repository_path(), None::<&()>)
            .await
            .map(ApiRepository::into)
            .map_err(|error| map_octocrab_error("repository", &error))
    }

    async fn pull_request(
        &self,
        repository: &RepositoryCoordinates,
        number: PullRequestNumber,
    ) -> Result<PullRequestInfo, GitHubError> {
        self.client
            .get::<ApiPullRequest, _, _>(repository.pull_request_path(number), None::<&()>)
            .await
            .map(ApiPullRequest::into)
            .map_err(|error| map_octocrab_error("pull request", &error))
    }

    async fn file_content(
        &self,
        repository: &RepositoryCoordinates,
        path: &str,
    ) -> Result<Vec<u8>, GitHubError> {
        let content = self
            .client
            .get::<ApiContent, _, _>(repository.contents_path(path), None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("file content", &error))?;

        content.decode(path)
    }
}
