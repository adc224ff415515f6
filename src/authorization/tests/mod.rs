//! Unit tests for the authorization engine.

use std::sync::Arc;

use crate::authorization::{
    AuthorizationEngine, AuthorizationRequest, CommentRequest, InstallationVerifier, ServicePolicy,
};
use crate::github::MockRepositoryDataProvider;
use crate::identity::{IdentityAttributes, IdentityContext, TokenType};

mod policy;

fn target_request() -> AuthorizationRequest {
    AuthorizationRequest::parse(&CommentRequest::new("safedep", "ghcp", "1", "test comment"))
        .expect("sample request should validate")
}

fn workload_identity(
    owner: Option<&str>,
    repository: Option<&str>,
    audience: Option<&str>,
    visibility: Option<&str>,
) -> IdentityContext {
    IdentityContext::new(
        TokenType::WorkloadIdentity,
        IdentityAttributes {
            repository_owner: owner.map(ToOwned::to_owned),
            repository: repository.map(ToOwned::to_owned),
            audience: audience.map(ToOwned::to_owned),
            repository_visibility: visibility.map(ToOwned::to_owned),
            ..IdentityAttributes::default()
        },
    )
}

fn token_identity(token_type: TokenType) -> IdentityContext {
    IdentityContext::new(
        token_type,
        IdentityAttributes {
            actor: Some("octocat".to_owned()),
            ..IdentityAttributes::default()
        },
    )
}

fn verifier(path: &str, pattern: &str) -> InstallationVerifier {
    InstallationVerifier::new(path, pattern).expect("test pattern should compile")
}

fn engine(policy: ServicePolicy, provider: MockRepositoryDataProvider) -> AuthorizationEngine {
    AuthorizationEngine::new(policy, Arc::new(provider)).expect("test policy should be valid")
}
