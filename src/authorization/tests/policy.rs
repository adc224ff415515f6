//! Policy invariants and installation verifier parsing.

use std::sync::Arc;

use rstest::rstest;

use crate::authorization::{
    AuthorizationEngine, DEFAULT_BOT_USERNAME, DEFAULT_TOKEN_AUDIENCE, InstallationVerifier,
    PolicyError, ServicePolicy,
};
use crate::github::MockRepositoryDataProvider;

#[rstest]
fn default_policy_is_secure_and_valid() {
    let policy = ServicePolicy::default();

    assert!(policy.allow_only_public_repositories);
    assert!(policy.allow_only_own_comment_updates);
    assert!(!policy.insecure_skip_authorization);
    assert!(!policy.skip_identity_verification);
    assert_eq!(policy.bot_username, DEFAULT_BOT_USERNAME);
    assert_eq!(policy.token_audience, DEFAULT_TOKEN_AUDIENCE);
    assert_eq!(policy.validate(), Ok(()));
}

#[rstest]
#[case::empty("")]
#[case::blank("   ")]
fn own_updates_require_bot_username(#[case] bot_username: &str) {
    let policy = ServicePolicy {
        bot_username: bot_username.to_owned(),
        ..ServicePolicy::default()
    };

    assert_eq!(policy.validate(), Err(PolicyError::MissingBotUsername));
}

#[rstest]
fn bot_username_optional_when_any_comment_may_be_updated() {
    let policy = ServicePolicy {
        allow_only_own_comment_updates: false,
        bot_username: String::new(),
        ..ServicePolicy::default()
    };

    assert_eq!(policy.validate(), Ok(()));
}

#[rstest]
fn skipping_identity_requires_installation_verifiers() {
    let policy = ServicePolicy {
        skip_identity_verification: true,
        ..ServicePolicy::default()
    };

    let error = policy.validate().expect_err("policy should be rejected");
    assert_eq!(error, PolicyError::MissingInstallationVerifiers);
    assert_eq!(
        error.to_string(),
        "skip workload identity token verification is true but no installation verifiers are provided"
    );
}

#[rstest]
fn engine_refuses_invalid_policy() {
    let policy = ServicePolicy {
        bot_username: String::new(),
        ..ServicePolicy::default()
    };

    let result = AuthorizationEngine::new(policy, Arc::new(MockRepositoryDataProvider::new()));
    assert!(matches!(result, Err(PolicyError::MissingBotUsername)));
}

#[rstest]
#[case::skip_identity(true, false)]
#[case::verify_installation(false, true)]
#[case::both(true, true)]
fn installation_check_required_by_either_flag(
    #[case] skip_identity_verification: bool,
    #[case] verify_installation: bool,
) {
    let policy = ServicePolicy {
        skip_identity_verification,
        verify_installation,
        ..ServicePolicy::default()
    };
    assert!(policy.requires_installation_check());
    assert!(!ServicePolicy::default().requires_installation_check());
}

#[rstest]
fn default_verifiers_recognise_vet_action() {
    let verifiers = InstallationVerifier::defaults().expect("built-in patterns should compile");

    let paths: Vec<&str> = verifiers.iter().map(InstallationVerifier::path).collect();
    assert_eq!(
        paths,
        vec![".github/workflows/vet.yml", ".github/workflows/vet-ci.yml"]
    );
    assert!(verifiers.iter().all(|verifier| {
        verifier.matches(b"jobs:\n  vet:\n    steps:\n      - uses:   safedep/vet-action@v1\n")
    }));
    assert!(
        verifiers
            .iter()
            .all(|verifier| !verifier.matches(b"uses: safedep/other-action@v1"))
    );
}

#[rstest]
#[case::simple("p=test-content", "p", "test-content")]
#[case::equals_in_pattern("ci.yml=key=value", "ci.yml", "key=value")]
#[case::padded_path(" .github/workflows/vet.yml =vet", ".github/workflows/vet.yml", "vet")]
fn parses_path_pattern_entries(#[case] entry: &str, #[case] path: &str, #[case] pattern: &str) {
    let verifier = InstallationVerifier::parse(entry).expect("entry should parse");
    assert_eq!(verifier.path(), path);
    assert_eq!(verifier.pattern(), pattern);
}

#[rstest]
#[case::no_separator("just-a-path")]
#[case::empty_path("=pattern")]
#[case::empty_pattern("path=")]
fn rejects_malformed_entries(#[case] entry: &str) {
    assert_eq!(
        InstallationVerifier::parse(entry).map(|verifier| verifier.path().to_owned()),
        Err(PolicyError::MalformedVerifier {
            entry: entry.to_owned()
        })
    );
}

#[rstest]
fn rejects_invalid_pattern() {
    let result = InstallationVerifier::parse("p=uses:(unclosed");
    assert!(
        matches!(result, Err(PolicyError::InvalidPattern { ref path, .. }) if path == "p"),
        "expected invalid pattern error"
    );
}
