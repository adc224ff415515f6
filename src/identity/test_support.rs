//! Signed-token helpers for exercising OIDC verification.
//!
//! Tokens are signed with a throwaway RSA key kept under `tests/fixtures`.
//! [`trusted_key_set`] publishes its public half; [`sign_untrusted`] signs
//! with a second key under the same key id to simulate forgery.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};

use super::oidc::{GITHUB_ACTIONS_ISSUER, OidcSignatureVerifier};

/// Key id used for every test token.
pub const TEST_KEY_ID: &str = "ghcp-test-key";

const TRUSTED_KEY_PEM: &str = include_str!("../../tests/fixtures/oidc_signing_key.pem");
const UNTRUSTED_KEY_PEM: &str = include_str!("../../tests/fixtures/untrusted_signing_key.pem");
const TRUSTED_KEY_MODULUS: &str = concat!(
    "t-wFNR5oHnwIANkwJz5TJg5G9maLrARJkbz5-eMX7gSoW5dXuWuwOann05YpS4tz8zbchgZ4lAJw8HTJvgrrcy6M",
    "pf-d7Hmrtm2rcL5zGaVQpBrk-E9nHJYKlgl3VZw6rW7z60wXjG-41o7Qt1In7AcfLvtbo-yoht7_wwCKukx_n4ix_",
    "ukM_ywaWtLWzYIbRI2pEUyfZ_lAIKEpsvrX61ZxYu6WBdpr6Iv-GvzEsbpoTaEpar8u4HAJOlKkNqftQHGBJcE4WL",
    "yZpLHy7tIXL9mpR0183QAFI6u8XYL0HlVIzcH09L47sNzmN4XqLdf2tJsDvfcfXXU2D22jr2ST4Q",
);

/// JWKS document publishing the trusted test key.
#[must_use]
pub fn trusted_jwks_document() -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": TEST_KEY_ID,
            "n": TRUSTED_KEY_MODULUS,
            "e": "AQAB"
        }]
    })
}

/// Parsed form of [`trusted_jwks_document`].
///
/// # Errors
///
/// Returns the decode error if the document does not parse as a key set.
pub fn trusted_key_set() -> Result<JwkSet, serde_json::Error> {
    serde_json::from_value(trusted_jwks_document())
}

/// Verifier pinned to the GitHub Actions issuer that trusts the test key.
///
/// # Errors
///
/// Returns the decode error if the key set does not parse.
pub fn trusted_verifier() -> Result<OidcSignatureVerifier, serde_json::Error> {
    trusted_key_set().map(|keys| OidcSignatureVerifier::from_key_set(GITHUB_ACTIONS_ISSUER, keys))
}

/// Claims GitHub Actions would issue for a workflow in `owner/repo`.
///
/// Expires ten minutes from now.
#[must_use]
pub fn workload_claims(owner: &str, repository: &str, audience: &str) -> Value {
    json!({
        "iss": GITHUB_ACTIONS_ISSUER,
        "sub": format!("repo:{owner}/{repository}:pull_request"),
        "aud": audience,
        "exp": seconds_from_now(600),
        "iat": seconds_from_now(0),
        "repository": format!("{owner}/{repository}"),
        "repository_owner": owner,
        "repository_visibility": "public",
        "repository_id": "123456",
        "repository_owner_id": "654321",
        "ref": "refs/pull/1/merge",
        "ref_type": "branch",
        "run_id": "42",
        "run_number": "7",
        "run_attempt": "1",
        "runner_environment": "github-hosted",
        "actor": "octocat",
        "workflow": "vet",
        "workflow_ref": format!("{owner}/{repository}/.github/workflows/vet.yml@refs/pull/1/merge"),
        "event_name": "pull_request"
    })
}

/// Seconds since the Unix epoch, offset by `offset` seconds.
#[must_use]
pub fn seconds_from_now(offset: i64) -> i64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX));
    now.saturating_add(offset)
}

/// Signs `claims` with the trusted key.
///
/// # Errors
///
/// Returns the encoder error if signing fails.
pub fn sign(claims: &Value) -> Result<String, jsonwebtoken::errors::Error> {
    sign_with(TRUSTED_KEY_PEM, claims)
}

/// Signs `claims` with a key the verifier does not trust, reusing the
/// trusted key id.
///
/// # Errors
///
/// Returns the encoder error if signing fails.
pub fn sign_untrusted(claims: &Value) -> Result<String, jsonwebtoken::errors::Error> {
    sign_with(UNTRUSTED_KEY_PEM, claims)
}

fn sign_with(pem: &str, claims: &Value) -> Result<String, jsonwebtoken::errors::Error> {
    let key = EncodingKey::from_rsa_pem(pem.as_bytes())?;
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KEY_ID.to_owned());
    encode(&header, claims, &key)
}
