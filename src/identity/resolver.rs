//! Turns an inbound credential into a verified [`IdentityContext`].

use std::sync::Arc;

use super::claims::extract_attributes;
use super::error::{AuthenticationError, AuthenticationFailure};
use super::oidc::{GITHUB_ACTIONS_ISSUER, TokenVerifier};
use super::token::{TokenClass, TokenPrefix, classify};
use super::{IdentityAttributes, IdentityContext, TokenType};
use crate::github::RepositoryDataProvider;

const BEARER_PREFIX: &str = "Bearer ";

/// Extracts the token from an `Authorization` header value.
///
/// The `Bearer ` prefix is optional.
///
/// # Errors
///
/// Returns [`AuthenticationFailure::MissingCredential`] when the header is
/// absent or empty once the prefix is removed.
///
/// # Examples
///
/// ```
/// use ghcp::identity::bearer_token;
///
/// assert_eq!(bearer_token(Some("Bearer ghp_abc")).ok(), Some("ghp_abc"));
/// assert!(bearer_token(Some("Bearer ")).is_err());
/// assert!(bearer_token(None).is_err());
/// ```
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthenticationError> {
    let token = header
        .map(|value| value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim())
        .unwrap_or_default();

    if token.is_empty() {
        return Err(AuthenticationFailure::MissingCredential.into());
    }
    Ok(token)
}

/// Resolves credentials into identities, failing closed.
#[derive(Clone)]
pub struct IdentityResolver {
    provider: Arc<dyn RepositoryDataProvider>,
    verifier: Arc<dyn TokenVerifier>,
}

impl IdentityResolver {
    /// Creates a resolver that looks up opaque tokens through `provider` and
    /// verifies signed tokens with `verifier`.
    #[must_use]
    pub const fn new(
        provider: Arc<dyn RepositoryDataProvider>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self { provider, verifier }
    }

    /// Resolves a credential, with or without its `Bearer ` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError`] when the credential is missing, GitHub
    /// does not recognise it, or its signature does not verify against the
    /// GitHub Actions issuer. No partial
    /// identity is ever returned.
    pub async fn resolve(&self, credential: &str) -> Result<IdentityContext, AuthenticationError> {
        let token = bearer_token(Some(credential))?;

        let result = match classify(token) {
            TokenClass::PersonalAccess(prefix) => self.resolve_github_token(token, prefix).await,
            TokenClass::SignedOidc => self.resolve_signed_token(token),
        };

        if let Err(error) = &result {
            tracing::debug!("authentication failed: {:?}", error.kind());
        }
        result
    }

    async fn resolve_github_token(
        &self,
        token: &str,
        prefix: TokenPrefix,
    ) -> Result<IdentityContext, AuthenticationError> {
        tracing::debug!("authenticating {} token with GitHub", prefix.as_str());

        let user = self.provider.identity(token).await.map_err(|error| {
            AuthenticationError::new(AuthenticationFailure::IdentityLookup {
                message: error.to_string(),
            })
        })?;
        tracing::debug!("token belongs to {}", user.login);

        Ok(IdentityContext::new(
            prefix.token_type(),
            IdentityAttributes {
                actor: Some(user.login),
                ..IdentityAttributes::default()
            },
        ))
    }

    fn resolve_signed_token(&self, token: &str) -> Result<IdentityContext, AuthenticationError> {
        tracing::debug!("authenticating signed workload identity token");

        self.verifier.verify(token).map_err(|error| {
            AuthenticationError::new(AuthenticationFailure::SignatureVerification {
                message: error.to_string(),
            })
        })?;

        let attributes = extract_attributes(token).map_err(|error| {
            AuthenticationError::new(AuthenticationFailure::MalformedToken {
                message: error.to_string(),
            })
        })?;

        if attributes.issuer.as_deref() != Some(GITHUB_ACTIONS_ISSUER) {
            return Err(AuthenticationFailure::UntrustedIssuer {
                issuer: attributes.issuer,
            }
            .into());
        }

        Ok(IdentityContext::new(TokenType::WorkloadIdentity, attributes))
    }
}
