//! Unverified decoding of a JWT payload into identity attributes.
//!
//! Only call this once the signature has been checked; nothing here is
//! cryptographic.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};

use super::IdentityAttributes;

/// Reasons a token payload could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimsError {
    /// The token is not three dot-separated segments.
    #[error("token is not a compact JWT")]
    NotCompact,
    /// The payload segment is not base64url.
    #[error("token payload is not base64url: {0}")]
    Encoding(String),
    /// The payload is not a JSON object.
    #[error("token payload is not a JSON object: {0}")]
    Json(String),
}

/// Decodes the payload segment of `token` into a claim map.
///
/// # Errors
///
/// Returns [`ClaimsError`] when the token shape, encoding, or JSON is invalid.
pub fn decode_claims(token: &str) -> Result<Map<String, Value>, ClaimsError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ClaimsError::NotCompact);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|error| ClaimsError::Encoding(error.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|error| ClaimsError::Json(error.to_string()))
}

/// Extracts the identity attribute set from `token` without verifying it.
///
/// # Errors
///
/// Returns [`ClaimsError`] when the payload cannot be decoded.
pub fn extract_attributes(token: &str) -> Result<IdentityAttributes, ClaimsError> {
    decode_claims(token).map(|claims| IdentityAttributes::from_claims(&claims))
}

impl IdentityAttributes {
    /// Builds attributes from a claim map, keeping only string-valued claims.
    #[must_use]
    pub fn from_claims(claims: &Map<String, Value>) -> Self {
        let text = |name: &str| claims.get(name).and_then(Value::as_str).map(str::to_owned);

        Self {
            subject: text("sub"),
            issuer: text("iss"),
            audience: text("aud"),
            environment: text("environment"),
            repository: text("repository"),
            repository_owner: text("repository_owner"),
            repository_owner_id: text("repository_owner_id"),
            repository_visibility: text("repository_visibility"),
            repository_id: text("repository_id"),
            git_ref: text("ref"),
            ref_type: text("ref_type"),
            head_ref: text("head_ref"),
            base_ref: text("base_ref"),
            run_id: text("run_id"),
            run_number: text("run_number"),
            run_attempt: text("run_attempt"),
            runner_environment: text("runner_environment"),
            actor: text("actor"),
            workflow: text("workflow"),
            workflow_ref: text("workflow_ref"),
            workflow_sha: text("workflow_sha"),
            job_workflow_ref: text("job_workflow_ref"),
            event_name: text("event_name"),
        }
    }
}
