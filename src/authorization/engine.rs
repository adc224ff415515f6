//! Matches verified identities against requested comment targets.

use std::sync::Arc;

use crate::github::models::PUBLIC_VISIBILITY;
use crate::github::{GitHubError, RepositoryDataProvider};
use crate::identity::{IdentityAttributes, IdentityContext, TokenType};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

use super::decision::AuthorizationDecision;
use super::installation::verify_installation;
use super::policy::{PolicyError, ServicePolicy};
use super::request::AuthorizationRequest;

/// Decides whether an identity may write to a requested pull request.
///
/// Every path fails closed: a missing claim or an unrecognised identity is a
/// deny. Provider failures surface as errors, never as an allow.
pub struct AuthorizationEngine {
    policy: ServicePolicy,
    provider: Arc<dyn RepositoryDataProvider>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl AuthorizationEngine {
    /// Creates an engine after validating `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when the policy violates an invariant.
    pub fn new(
        policy: ServicePolicy,
        provider: Arc<dyn RepositoryDataProvider>,
    ) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self {
            policy,
            provider,
            telemetry: Arc::new(NoopTelemetrySink),
        })
    }

    /// Replaces the telemetry sink.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// The enforced policy.
    #[must_use]
    pub const fn policy(&self) -> &ServicePolicy {
        &self.policy
    }

    /// Authorizes `identity` to comment on the target of `request`.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError`] when live repository state cannot be read.
    pub async fn authorize(
        &self,
        identity: &IdentityContext,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationDecision, GitHubError> {
        let access = if self.policy.insecure_skip_authorization {
            AuthorizationDecision::allow("authorization checks are disabled")
        } else if self.policy.skip_identity_verification {
            AuthorizationDecision::allow("identity verification is skipped")
        } else {
            self.verify_repository_access(identity, request).await?
        };

        if !access.is_allowed() {
            return Ok(access);
        }
        Ok(self.verify_installation_if_required(request, access).await)
    }

    /// Authorizes a request that carries no identity at all.
    ///
    /// Only possible when authorization is disabled or identity
    /// verification is replaced by installation verification.
    ///
    /// # Errors
    ///
    /// Reserved for provider failures; installation fetch failures are
    /// treated as "not installed".
    pub async fn authorize_anonymous(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationDecision, GitHubError> {
        let access = if self.policy.insecure_skip_authorization {
            AuthorizationDecision::allow("authorization checks are disabled")
        } else if self.policy.skip_identity_verification {
            AuthorizationDecision::allow("identity verification is skipped")
        } else {
            return Ok(AuthorizationDecision::deny("caller identity is required"));
        };

        Ok(self.verify_installation_if_required(request, access).await)
    }

    async fn verify_repository_access(
        &self,
        identity: &IdentityContext,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationDecision, GitHubError> {
        self.telemetry.record(TelemetryEvent::RepositoryAccessVerified {
            repository: request.repository().full_name(),
        });

        match identity.token_type() {
            TokenType::WorkloadIdentity => {
                Ok(self.verify_workload_identity(identity.attributes(), request))
            }
            TokenType::ActionToken => self.verify_action_token(request).await,
            TokenType::PersonalAccessToken => Ok(self.verify_personal_token()),
        }
    }

    fn verify_workload_identity(
        &self,
        claims: &IdentityAttributes,
        request: &AuthorizationRequest,
    ) -> AuthorizationDecision {
        let expected_audience = self.policy.token_audience.as_str();
        if !matches_ignoring_case(claims.audience.as_deref(), expected_audience) {
            return AuthorizationDecision::deny(format!(
                "audience mismatch: {} != {expected_audience}",
                display_claim(claims.audience.as_deref())
            ));
        }

        let owner = request.repository().owner().as_str();
        if !matches_ignoring_case(claims.repository_owner.as_deref(), owner) {
            return AuthorizationDecision::deny(format!(
                "repository owner mismatch: {} != {owner}",
                display_claim(claims.repository_owner.as_deref())
            ));
        }

        let expected_repository = request.repository().full_name();
        if !matches_ignoring_case(claims.repository.as_deref(), &expected_repository) {
            return AuthorizationDecision::deny(format!(
                "repository mismatch: {} != {expected_repository}",
                display_claim(claims.repository.as_deref())
            ));
        }

        if self.policy.allow_only_public_repositories
            && claims.repository_visibility.as_deref() != Some(PUBLIC_VISIBILITY)
        {
            return AuthorizationDecision::deny(format!(
                "repository is not public: {}",
                display_claim(claims.repository_visibility.as_deref())
            ));
        }

        AuthorizationDecision::allow("workload identity matches the target repository")
    }

    async fn verify_action_token(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationDecision, GitHubError> {
        let repository = self.provider.repository(request.repository()).await?;
        if self.policy.allow_only_public_repositories && !repository.is_public() {
            return Ok(AuthorizationDecision::deny("repository is not public"));
        }

        let pull_request = self
            .provider
            .pull_request(request.repository(), request.pull_request())
            .await?;
        if !pull_request.is_open() {
            return Ok(AuthorizationDecision::deny(format!(
                "pull request is not open: {}",
                display_claim(pull_request.state.as_deref())
            )));
        }

        Ok(AuthorizationDecision::allow(
            "target repository and pull request verified",
        ))
    }

    fn verify_personal_token(&self) -> AuthorizationDecision {
        if self.policy.verify_installation {
            AuthorizationDecision::allow("personal access token pending installation check")
        } else {
            AuthorizationDecision::deny(
                "personal access tokens require installation verification",
            )
        }
    }

    async fn verify_installation_if_required(
        &self,
        request: &AuthorizationRequest,
        access: AuthorizationDecision,
    ) -> AuthorizationDecision {
        if !self.policy.requires_installation_check() {
            return access;
        }

        self.telemetry
            .record(TelemetryEvent::InstallationVerificationAttempted {
                repository: request.repository().full_name(),
            });
        verify_installation(
            self.provider.as_ref(),
            request.repository(),
            &self.policy.installation_verifiers,
        )
        .await
    }
}

fn matches_ignoring_case(claim: Option<&str>, expected: &str) -> bool {
    claim.is_some_and(|value| value.eq_ignore_ascii_case(expected))
}

fn display_claim(claim: Option<&str>) -> &str {
    claim.unwrap_or("<missing>")
}
