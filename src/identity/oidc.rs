//! Signature and issuer verification for GitHub Actions OIDC tokens.
//!
//! Signing keys are discovered once, through the issuer's
//! `/.well-known/openid-configuration` document, and never mutated
//! afterwards. Every request verifies against that snapshot.

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

/// Issuer of the workload identity tokens GitHub Actions mints.
pub const GITHUB_ACTIONS_ISSUER: &str = "https://token.actions.githubusercontent.com";

/// Verifies the signature and issuer of a signed token.
///
/// Audience is deliberately not part of the contract; it is a policy
/// decision taken by the authorization engine.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token`.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError`] when the token is malformed, signed by
    /// an unknown key, expired, or issued by someone else.
    fn verify(&self, token: &str) -> Result<(), VerificationError>;
}

/// Reasons a token failed verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// The JOSE header could not be decoded.
    #[error("token header is malformed: {0}")]
    MalformedHeader(String),

    /// The header names no signing key.
    #[error("token header does not name a signing key")]
    MissingKeyId,

    /// The issuer never published the named key.
    #[error("issuer has no signing key {kid}")]
    UnknownKey {
        /// Key id from the token header.
        kid: String,
    },

    /// The published key cannot be used for RS256 verification.
    #[error("signing key {kid} is unusable: {message}")]
    UnusableKey {
        /// Key id from the token header.
        kid: String,
        /// Decoder detail.
        message: String,
    },

    /// Signature, algorithm, issuer, or expiry check failed.
    #[error("token rejected: {0}")]
    Rejected(String),
}

/// Failures while loading an issuer's signing keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyDiscoveryError {
    /// An HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The issuer is not an absolute URL.
    #[error("issuer {issuer} is not a valid URL: {message}")]
    InvalidIssuer {
        /// Issuer that was asked for.
        issuer: String,
        /// Parser detail.
        message: String,
    },

    /// A discovery or key-set document could not be fetched or parsed.
    #[error("failed to fetch {url}: {message}")]
    Fetch {
        /// Document URL.
        url: String,
        /// Transport or decode detail.
        message: String,
    },

    /// The discovery document describes a different issuer.
    #[error("discovery document issuer {found} does not match {expected}")]
    IssuerMismatch {
        /// Issuer that was asked for.
        expected: String,
        /// Issuer the document reported.
        found: String,
    },
}

#[derive(Debug, Deserialize)]
struct DiscoveryDocument {
    issuer: String,
    jwks_uri: String,
}

/// Verifies RS256 tokens from a single issuer against a fixed key set.
#[derive(Debug, Clone)]
pub struct OidcSignatureVerifier {
    issuer: String,
    keys: JwkSet,
}

impl OidcSignatureVerifier {
    /// Creates a verifier for `issuer` using already-loaded keys.
    #[must_use]
    pub fn from_key_set(issuer: impl Into<String>, keys: JwkSet) -> Self {
        Self {
            issuer: issuer.into(),
            keys,
        }
    }

    /// Discovers the signing keys GitHub Actions publishes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyDiscoveryError`] when discovery or the key-set fetch fails.
    pub async fn github_actions() -> Result<Self, KeyDiscoveryError> {
        Self::discover(GITHUB_ACTIONS_ISSUER).await
    }

    /// Discovers the signing keys for `issuer`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyDiscoveryError`] when discovery or the key-set fetch fails.
    pub async fn discover(issuer: &str) -> Result<Self, KeyDiscoveryError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|error| KeyDiscoveryError::Client(error.to_string()))?;
        Self::discover_with_client(&client, issuer).await
    }

    /// Discovers the signing keys for `issuer` using `client`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyDiscoveryError`] when discovery or the key-set fetch fails,
    /// or when the discovery document names a different issuer.
    pub async fn discover_with_client(
        client: &reqwest::Client,
        issuer: &str,
    ) -> Result<Self, KeyDiscoveryError> {
        let expected_issuer = issuer.trim_end_matches('/');
        let document_url = discovery_url(expected_issuer)?;
        let document: DiscoveryDocument = fetch_json(client, document_url.as_str()).await?;

        if document.issuer.trim_end_matches('/') != expected_issuer {
            return Err(KeyDiscoveryError::IssuerMismatch {
                expected: expected_issuer.to_owned(),
                found: document.issuer,
            });
        }

        let keys: JwkSet = fetch_json(client, &document.jwks_uri).await?;
        tracing::debug!(
            "loaded {} signing keys for {expected_issuer}",
            keys.keys.len()
        );

        Ok(Self::from_key_set(expected_issuer, keys))
    }

    /// Issuer tokens must carry in their `iss` claim.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_aud = false;
        validation
    }
}

impl TokenVerifier for OidcSignatureVerifier {
    fn verify(&self, token: &str) -> Result<(), VerificationError> {
        let header = decode_header(token)
            .map_err(|error| VerificationError::MalformedHeader(error.to_string()))?;
        let kid = header.kid.ok_or(VerificationError::MissingKeyId)?;

        let jwk = self
            .keys
            .find(&kid)
            .ok_or_else(|| VerificationError::UnknownKey { kid: kid.clone() })?;
        let key = DecodingKey::from_jwk(jwk).map_err(|error| VerificationError::UnusableKey {
            kid: kid.clone(),
            message: error.to_string(),
        })?;

        decode::<Map<String, Value>>(token, &key, &self.validation())
            .map(|_verified| ())
            .map_err(|error| VerificationError::Rejected(error.to_string()))
    }
}

fn discovery_url(issuer: &str) -> Result<Url, KeyDiscoveryError> {
    Url::parse(&format!("{issuer}/"))
        .and_then(|base| base.join(".well-known/openid-configuration"))
        .map_err(|error| KeyDiscoveryError::InvalidIssuer {
            issuer: issuer.to_owned(),
            message: error.to_string(),
        })
}

async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, KeyDiscoveryError> {
    let fetch_error = |error: reqwest::Error| KeyDiscoveryError::Fetch {
        url: url.to_owned(),
        message: error.to_string(),
    };

    client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(fetch_error)?
        .json::<T>()
        .await
        .map_err(fetch_error)
}
