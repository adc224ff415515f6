//! Caller identity: token classification, verification, and claims.
//!
//! [`IdentityResolver::resolve`] is the only way to obtain an
//! [`IdentityContext`] from a credential. Opaque GitHub tokens are checked by
//! asking GitHub who owns them; anything else must be a GitHub Actions OIDC
//! token whose signature verifies against the issuer's published keys.

pub mod claims;
pub mod error;
pub mod oidc;
pub mod resolver;
pub mod token;

#[cfg(feature = "test-support")]
pub mod test_support;

pub use claims::{ClaimsError, extract_attributes};
pub use error::{AuthenticationError, AuthenticationFailure};
pub use oidc::{
    GITHUB_ACTIONS_ISSUER, KeyDiscoveryError, OidcSignatureVerifier, TokenVerifier,
    VerificationError,
};
pub use resolver::{IdentityResolver, bearer_token};
pub use token::{TokenClass, TokenPrefix, classify};

#[cfg(test)]
pub use oidc::MockTokenVerifier;

/// Kind of credential an identity was resolved from.
///
/// Selects the authorization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Long-lived user or app token; only the owning login is known.
    PersonalAccessToken,
    /// Installation token such as an Actions `GITHUB_TOKEN`; carries no
    /// repository claims, so targets are checked against live state.
    ActionToken,
    /// Verified GitHub Actions OIDC token with repository claims.
    WorkloadIdentity,
}

/// Claims carried by a verified identity.
///
/// Every field is optional: a missing claim is `None`, which is distinct
/// from a present but empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityAttributes {
    /// `sub`
    pub subject: Option<String>,
    /// `iss`
    pub issuer: Option<String>,
    /// `aud`, when it is a single string.
    pub audience: Option<String>,
    /// Deployment environment name.
    pub environment: Option<String>,
    /// `owner/repo` the workflow ran in.
    pub repository: Option<String>,
    /// Owner of the repository the workflow ran in.
    pub repository_owner: Option<String>,
    /// Numeric owner id.
    pub repository_owner_id: Option<String>,
    /// `public`, `private`, or `internal`.
    pub repository_visibility: Option<String>,
    /// Numeric repository id.
    pub repository_id: Option<String>,
    /// Git ref the workflow ran against (`ref` claim).
    pub git_ref: Option<String>,
    /// `branch` or `tag`.
    pub ref_type: Option<String>,
    /// Pull request head ref.
    pub head_ref: Option<String>,
    /// Pull request base ref.
    pub base_ref: Option<String>,
    /// Workflow run id.
    pub run_id: Option<String>,
    /// Workflow run number.
    pub run_number: Option<String>,
    /// Workflow run attempt.
    pub run_attempt: Option<String>,
    /// `github-hosted` or `self-hosted`.
    pub runner_environment: Option<String>,
    /// Login that triggered the run, or that owns an opaque token.
    pub actor: Option<String>,
    /// Workflow name.
    pub workflow: Option<String>,
    /// Workflow file reference.
    pub workflow_ref: Option<String>,
    /// Commit of the workflow file.
    pub workflow_sha: Option<String>,
    /// Reusable workflow reference.
    pub job_workflow_ref: Option<String>,
    /// Triggering event.
    pub event_name: Option<String>,
}

/// A verified caller identity, scoped to a single request.
///
/// The token type is fixed at construction and cannot be changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    token_type: TokenType,
    attributes: IdentityAttributes,
}

impl IdentityContext {
    /// Creates an identity of the given type.
    #[must_use]
    pub const fn new(token_type: TokenType, attributes: IdentityAttributes) -> Self {
        Self {
            token_type,
            attributes,
        }
    }

    /// Credential kind the identity was resolved from.
    #[must_use]
    pub const fn token_type(&self) -> TokenType {
        self.token_type
    }

    /// Claims attached to the identity.
    #[must_use]
    pub const fn attributes(&self) -> &IdentityAttributes {
        &self.attributes
    }
}

#[cfg(test)]
mod tests;
