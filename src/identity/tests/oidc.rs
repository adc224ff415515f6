//! Tests for signature verification and signing-key discovery.

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::identity::test_support::{
    TEST_KEY_ID, seconds_from_now, sign, sign_untrusted, trusted_jwks_document, trusted_key_set,
    trusted_verifier, workload_claims,
};
use crate::identity::{
    GITHUB_ACTIONS_ISSUER, KeyDiscoveryError, OidcSignatureVerifier, TokenVerifier,
    VerificationError,
};

#[fixture]
fn verifier() -> OidcSignatureVerifier {
    trusted_verifier().expect("test key set should parse")
}

#[fixture]
fn claims() -> Value {
    workload_claims("safedep", "ghcp", "safedep-ghcp")
}

#[rstest]
fn accepts_token_signed_by_published_key(verifier: OidcSignatureVerifier, claims: Value) {
    let token = sign(&claims).expect("token should sign");
    assert_eq!(verifier.verify(&token), Ok(()));
}

#[rstest]
#[case::configured("safedep-ghcp")]
#[case::unrelated("https://github.com/safedep")]
fn does_not_check_audience(verifier: OidcSignatureVerifier, #[case] audience: &str) {
    let token = sign(&workload_claims("safedep", "ghcp", audience)).expect("token should sign");
    assert_eq!(verifier.verify(&token), Ok(()));
}

#[rstest]
fn rejects_forged_signature(verifier: OidcSignatureVerifier, claims: Value) {
    let token = sign_untrusted(&claims).expect("token should sign");
    assert!(
        matches!(verifier.verify(&token), Err(VerificationError::Rejected(_))),
        "forged token must not verify"
    );
}

#[rstest]
fn rejects_tampered_payload(verifier: OidcSignatureVerifier, claims: Value) {
    let token = sign(&claims).expect("token should sign");
    let forged = sign(&workload_claims("attacker", "target", "safedep-ghcp"))
        .expect("token should sign");

    let mut original = token.split('.');
    let mut replacement = forged.split('.');
    let spliced = format!(
        "{}.{}.{}",
        original.next().expect("header"),
        replacement.nth(1).expect("payload"),
        original.nth(1).expect("signature"),
    );

    assert!(matches!(
        verifier.verify(&spliced),
        Err(VerificationError::Rejected(_))
    ));
}

#[rstest]
fn rejects_expired_token(verifier: OidcSignatureVerifier, mut claims: Value) {
    claims["exp"] = json!(seconds_from_now(-3600));
    let token = sign(&claims).expect("token should sign");

    assert!(matches!(
        verifier.verify(&token),
        Err(VerificationError::Rejected(_))
    ));
}

#[rstest]
fn rejects_token_without_expiry(verifier: OidcSignatureVerifier, mut claims: Value) {
    claims
        .as_object_mut()
        .expect("claims are an object")
        .remove("exp");
    let token = sign(&claims).expect("token should sign");

    assert!(matches!(
        verifier.verify(&token),
        Err(VerificationError::Rejected(_))
    ));
}

#[rstest]
#[case::other_issuer(json!("https://accounts.google.com"))]
#[case::trailing_slash(json!(format!("{GITHUB_ACTIONS_ISSUER}/")))]
#[case::not_a_string(json!(7))]
fn rejects_foreign_issuer(verifier: OidcSignatureVerifier, mut claims: Value, #[case] issuer: Value) {
    claims["iss"] = issuer;
    let token = sign(&claims).expect("token should sign");

    assert!(verifier.verify(&token).is_err(), "issuer must be pinned");
}

#[rstest]
fn rejects_symmetric_algorithm(verifier: OidcSignatureVerifier, claims: Value) {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(TEST_KEY_ID.to_owned());
    let token = encode(&header, &claims, &EncodingKey::from_secret(b"shared-secret"))
        .expect("token should sign");

    assert!(matches!(
        verifier.verify(&token),
        Err(VerificationError::Rejected(_))
    ));
}

#[rstest]
fn rejects_unknown_key_id(claims: Value) {
    let mut document = trusted_jwks_document();
    document["keys"][0]["kid"] = json!("rotated-away");
    let keys: JwkSet = serde_json::from_value(document).expect("key set should parse");
    let verifier = OidcSignatureVerifier::from_key_set(GITHUB_ACTIONS_ISSUER, keys);

    let token = sign(&claims).expect("token should sign");

    assert_eq!(
        verifier.verify(&token),
        Err(VerificationError::UnknownKey {
            kid: TEST_KEY_ID.to_owned()
        })
    );
}

#[rstest]
#[case::garbage("not-a-token")]
#[case::empty("")]
fn rejects_malformed_header(verifier: OidcSignatureVerifier, #[case] token: &str) {
    assert!(matches!(
        verifier.verify(token),
        Err(VerificationError::MalformedHeader(_))
    ));
}

async fn mount_discovery(server: &MockServer, issuer: &str) {
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": issuer,
            "jwks_uri": format!("{}/.well-known/jwks", server.uri()),
            "id_token_signing_alg_values_supported": ["RS256"]
        })))
        .mount(server)
        .await;
}

#[rstest]
#[tokio::test]
async fn discovers_keys_from_issuer_metadata(mut claims: Value) {
    let server = MockServer::start().await;
    mount_discovery(&server, &server.uri()).await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(trusted_jwks_document()))
        .expect(1)
        .mount(&server)
        .await;

    let verifier = OidcSignatureVerifier::discover(&server.uri())
        .await
        .expect("discovery should succeed");
    claims["iss"] = json!(server.uri());
    let token = sign(&claims).expect("token should sign");

    assert_eq!(verifier.issuer(), server.uri());
    assert_eq!(verifier.verify(&token), Ok(()));
}

#[rstest]
#[tokio::test]
async fn discovery_rejects_document_for_another_issuer() {
    let server = MockServer::start().await;
    mount_discovery(&server, "https://issuer.example.com").await;

    let result = OidcSignatureVerifier::discover(&server.uri()).await;

    assert!(
        matches!(result, Err(KeyDiscoveryError::IssuerMismatch { .. })),
        "expected issuer mismatch, got {result:?}"
    );
}

#[rstest]
#[tokio::test]
async fn discovery_surfaces_key_set_fetch_failure() {
    let server = MockServer::start().await;
    mount_discovery(&server, &server.uri()).await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = OidcSignatureVerifier::discover(&server.uri()).await;

    assert!(
        matches!(result, Err(KeyDiscoveryError::Fetch { .. })),
        "expected fetch failure, got {result:?}"
    );
}

#[rstest]
#[tokio::test]
async fn discovery_rejects_issuer_that_is_not_a_url() {
    let result = OidcSignatureVerifier::discover("token issuer").await;

    assert!(
        matches!(result, Err(KeyDiscoveryError::InvalidIssuer { .. })),
        "expected invalid issuer, got {result:?}"
    );
}

#[rstest]
fn key_set_fixture_publishes_test_key() {
    let keys = trusted_key_set().expect("key set should parse");
    assert!(keys.find(TEST_KEY_ID).is_some());
}
