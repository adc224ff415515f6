//! Unit tests for the comment service and relay.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::authorization::{InstallationVerifier, ServicePolicy};
use crate::github::{
    CommentId, CommentStore, GitHubError, IssueComment, MockCommentStore,
    MockRepositoryDataProvider, PullRequestNumber, RepositoryCoordinates,
};
use crate::identity::{IdentityAttributes, IdentityContext, TokenType};
use crate::service::CommentProxyService;

mod relay;

fn safedep_identity() -> IdentityContext {
    IdentityContext::new(
        TokenType::WorkloadIdentity,
        IdentityAttributes {
            repository: Some("safedep/ghcp".to_owned()),
            repository_owner: Some("safedep".to_owned()),
            repository_visibility: Some("public".to_owned()),
            audience: Some("safedep-ghcp".to_owned()),
            ..IdentityAttributes::default()
        },
    )
}

fn service(
    policy: ServicePolicy,
    provider: MockRepositoryDataProvider,
    comments: MockCommentStore,
) -> CommentProxyService {
    CommentProxyService::new(policy, Arc::new(provider), Arc::new(comments))
        .expect("test policy should be valid")
}

fn skip_identity_policy() -> ServicePolicy {
    ServicePolicy {
        skip_identity_verification: true,
        installation_verifiers: vec![
            InstallationVerifier::new("p", "test-content").expect("pattern should compile"),
        ],
        ..ServicePolicy::default()
    }
}

/// Comment store whose every call takes `delay` to complete.
struct SlowCommentStore {
    delay: Duration,
}

#[async_trait]
impl CommentStore for SlowCommentStore {
    async fn list_comments(
        &self,
        _repository: &RepositoryCoordinates,
        _number: PullRequestNumber,
    ) -> Result<Vec<IssueComment>, GitHubError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }

    async fn create_comment(
        &self,
        _repository: &RepositoryCoordinates,
        _number: PullRequestNumber,
        _body: &str,
    ) -> Result<CommentId, GitHubError> {
        tokio::time::sleep(self.delay).await;
        Ok(CommentId::new(1))
    }

    async fn update_comment(
        &self,
        _repository: &RepositoryCoordinates,
        comment: CommentId,
        _body: &str,
    ) -> Result<CommentId, GitHubError> {
        tokio::time::sleep(self.delay).await;
        Ok(comment)
    }
}
