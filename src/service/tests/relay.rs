//! End-to-end request handling through [`CommentRelay`].

use std::sync::Arc;

use rstest::rstest;

use crate::authorization::{CommentRequest, ServicePolicy};
use crate::github::{
    CommentId, MockCommentStore, MockRepositoryDataProvider, PullRequestInfo, RepositoryInfo,
    TokenUser,
};
use crate::identity::test_support::{sign, sign_untrusted, trusted_verifier, workload_claims};
use crate::identity::{AuthenticationFailure, IdentityResolver, MockTokenVerifier};
use crate::service::{CommentProxyService, CommentRelay, ServiceError};
use crate::telemetry::TelemetryEvent;
use crate::telemetry::test_support::RecordingSink;

fn request() -> CommentRequest {
    CommentRequest::new("safedep", "ghcp", "1", "test comment")
}

fn creating_store(times: usize) -> MockCommentStore {
    let mut comments = MockCommentStore::new();
    comments
        .expect_create_comment()
        .times(times)
        .returning(|_, _, _| Ok(CommentId::new(42)));
    comments
}

fn oidc_relay(comments: MockCommentStore) -> CommentRelay {
    let resolver = IdentityResolver::new(
        Arc::new(MockRepositoryDataProvider::new()),
        Arc::new(trusted_verifier().expect("test key set should parse")),
    );
    let service = CommentProxyService::new(
        ServicePolicy::default(),
        Arc::new(MockRepositoryDataProvider::new()),
        Arc::new(comments),
    )
    .expect("default policy should be valid");
    CommentRelay::new(resolver, service)
}

#[rstest]
#[case::absent(None)]
#[case::empty(Some(""))]
#[case::empty_bearer(Some("Bearer "))]
#[tokio::test]
async fn missing_credential_is_unauthenticated(#[case] header: Option<&str>) {
    let sink = Arc::new(RecordingSink::default());
    let resolver = IdentityResolver::new(
        Arc::new(MockRepositoryDataProvider::new()),
        Arc::new(MockTokenVerifier::new()),
    );
    let policy = ServicePolicy {
        insecure_skip_authorization: true,
        ..ServicePolicy::default()
    };
    let service = CommentProxyService::new(
        policy,
        Arc::new(MockRepositoryDataProvider::new()),
        Arc::new(creating_store(0)),
    )
    .expect("policy should be valid")
    .with_telemetry(sink.clone());
    let relay = CommentRelay::new(resolver, service);

    let result = relay.handle(header, &request(), None).await;

    assert!(matches!(
        result,
        Err(ServiceError::Unauthenticated(ref error))
            if error.kind() == &AuthenticationFailure::MissingCredential
    ));
    assert_eq!(
        sink.take(),
        vec![TelemetryEvent::ExecutionFailed {
            reason: "unauthenticated".to_owned()
        }]
    );
}

#[rstest]
#[tokio::test]
async fn signed_workload_token_creates_comment() {
    let token = sign(&workload_claims("safedep", "ghcp", "safedep-ghcp")).expect("token should sign");
    let relay = oidc_relay(creating_store(1));
    let header = format!("Bearer {token}");

    let created = relay
        .handle(Some(header.as_str()), &request(), None)
        .await
        .expect("comment should be created");

    assert_eq!(created, CommentId::new(42));
}

#[rstest]
#[tokio::test]
async fn signed_token_for_other_repository_is_denied() {
    let token = sign(&workload_claims("safedep", "vet", "safedep-ghcp")).expect("token should sign");
    let relay = oidc_relay(creating_store(0));
    let header = format!("Bearer {token}");

    let result = relay
        .handle(Some(header.as_str()), &request(), None)
        .await;

    assert!(matches!(
        result,
        Err(ServiceError::AuthorizationDenied { ref reason }) if reason.starts_with("repository mismatch")
    ));
}

#[rstest]
#[tokio::test]
async fn forged_token_is_unauthenticated_with_generic_message() {
    let token = sign_untrusted(&workload_claims("safedep", "ghcp", "safedep-ghcp"))
        .expect("token should sign");
    let relay = oidc_relay(creating_store(0));
    let header = format!("Bearer {token}");

    let error = relay
        .handle(Some(header.as_str()), &request(), None)
        .await
        .expect_err("forged token must be rejected");

    assert!(matches!(error, ServiceError::Unauthenticated(_)));
    assert_eq!(error.to_string(), "authentication failed");
}

#[rstest]
#[tokio::test]
async fn installation_token_is_checked_against_live_state() {
    let mut identity_provider = MockRepositoryDataProvider::new();
    identity_provider
        .expect_identity()
        .withf(|token| token == "ghs_installation")
        .times(1)
        .returning(|_| {
            Ok(TokenUser {
                login: "github-actions[bot]".to_owned(),
            })
        });
    let mut state_provider = MockRepositoryDataProvider::new();
    state_provider.expect_repository().times(1).returning(|_| {
        Ok(RepositoryInfo {
            full_name: Some("safedep/ghcp".to_owned()),
            visibility: Some("public".to_owned()),
        })
    });
    state_provider
        .expect_pull_request()
        .times(1)
        .returning(|_, _| {
            Ok(PullRequestInfo {
                number: 1,
                state: Some("open".to_owned()),
            })
        });
    let resolver =
        IdentityResolver::new(Arc::new(identity_provider), Arc::new(MockTokenVerifier::new()));
    let service = CommentProxyService::new(
        ServicePolicy::default(),
        Arc::new(state_provider),
        Arc::new(creating_store(1)),
    )
    .expect("default policy should be valid");

    let created = CommentRelay::new(resolver, service)
        .handle(Some("Bearer ghs_installation"), &request(), None)
        .await
        .expect("comment should be created");

    assert_eq!(created, CommentId::new(42));
}
