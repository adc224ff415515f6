//! Authorized comment creation and tagged comment updates.

use std::sync::Arc;

use tokio::time::{Instant, timeout_at};

use crate::authorization::{
    AuthorizationEngine, AuthorizationRequest, CommentRequest, ServicePolicy,
};
use crate::github::{CommentId, CommentStore, IssueComment, RepositoryDataProvider};
use crate::identity::{AuthenticationFailure, IdentityContext};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

use super::error::ServiceError;

/// Writes pull request comments for authorized callers.
pub struct CommentProxyService {
    engine: AuthorizationEngine,
    comments: Arc<dyn CommentStore>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl CommentProxyService {
    /// Creates the service, validating `policy` first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Configuration`] when the policy is invalid,
    /// for example when own-comment updates are required without a bot
    /// username.
    pub fn new(
        policy: ServicePolicy,
        provider: Arc<dyn RepositoryDataProvider>,
        comments: Arc<dyn CommentStore>,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            engine: AuthorizationEngine::new(policy, provider)?,
            comments,
            telemetry: Arc::new(NoopTelemetrySink),
        })
    }

    /// Replaces the telemetry sink for the service and its engine.
    #[must_use]
    pub fn with_telemetry(self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            engine: self.engine.with_telemetry(Arc::clone(&telemetry)),
            comments: self.comments,
            telemetry,
        }
    }

    /// The enforced policy.
    #[must_use]
    pub const fn policy(&self) -> &ServicePolicy {
        self.engine.policy()
    }

    /// Authorizes `request` for `identity` and writes the comment.
    ///
    /// Without a tag a new comment is created. With a tag the first comment
    /// containing it is replaced.
    ///
    /// `identity` may only be `None` when the policy disables authorization
    /// or skips identity verification.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] describing the first check or call that
    /// failed.
    pub async fn execute(
        &self,
        identity: Option<&IdentityContext>,
        request: &CommentRequest,
    ) -> Result<CommentId, ServiceError> {
        let result = self.run(identity, request).await;
        self.record_outcome(&result);
        result
    }

    /// Like [`CommentProxyService::execute`], aborting at `deadline`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::DeadlineExceeded`] when the deadline passes
    /// first, or any error [`CommentProxyService::execute`] returns.
    pub async fn execute_until(
        &self,
        identity: Option<&IdentityContext>,
        request: &CommentRequest,
        deadline: Instant,
    ) -> Result<CommentId, ServiceError> {
        let result = timeout_at(deadline, self.run(identity, request))
            .await
            .unwrap_or(Err(ServiceError::DeadlineExceeded));
        self.record_outcome(&result);
        result
    }

    pub(crate) async fn run(
        &self,
        identity: Option<&IdentityContext>,
        request: &CommentRequest,
    ) -> Result<CommentId, ServiceError> {
        let target = AuthorizationRequest::parse(request)?;

        let decision = match identity {
            Some(caller) => self.engine.authorize(caller, &target).await?,
            None if self.allows_anonymous() => self.engine.authorize_anonymous(&target).await?,
            None => return Err(AuthenticationFailure::MissingCredential.into()),
        };

        if !decision.is_allowed() {
            return Err(ServiceError::AuthorizationDenied {
                reason: decision.reason().to_owned(),
            });
        }
        tracing::debug!("authorized comment on {}: {}", target.repository(), decision.reason());

        match target.tag() {
            None => self.create_comment(&target).await,
            Some(tag) => self.update_tagged_comment(&target, tag).await,
        }
    }

    pub(crate) fn record_outcome(&self, result: &Result<CommentId, ServiceError>) {
        match result {
            Ok(_) => self.telemetry.record(TelemetryEvent::ExecutionSucceeded),
            Err(error) => {
                tracing::error!("failed to execute service: {error}");
                self.telemetry.record(TelemetryEvent::ExecutionFailed {
                    reason: error.label().to_owned(),
                });
            }
        }
    }

    const fn allows_anonymous(&self) -> bool {
        let policy = self.engine.policy();
        policy.insecure_skip_authorization || policy.skip_identity_verification
    }

    async fn create_comment(&self, target: &AuthorizationRequest) -> Result<CommentId, ServiceError> {
        tracing::debug!("creating comment on PR: {}", target.pull_request());

        let comment_id = self
            .comments
            .create_comment(target.repository(), target.pull_request(), target.body())
            .await?;

        self.telemetry.record(TelemetryEvent::CommentCreated {
            repository: target.repository().full_name(),
            pull_request: target.pull_request().get(),
        });
        Ok(comment_id)
    }

    async fn update_tagged_comment(
        &self,
        target: &AuthorizationRequest,
        tag: &str,
    ) -> Result<CommentId, ServiceError> {
        tracing::debug!(
            "updating comment on PR: {} with tag: {tag}",
            target.pull_request()
        );

        let existing = self
            .comments
            .list_comments(target.repository(), target.pull_request())
            .await?;
        let Some(matched) = first_tagged(&existing, tag) else {
            tracing::debug!("no comment found with tag: {tag}");
            return Err(ServiceError::NotFound {
                tag: tag.to_owned(),
            });
        };

        let policy = self.engine.policy();
        if policy.allow_only_own_comment_updates
            && matched.author.as_deref() != Some(policy.bot_username.as_str())
        {
            return Err(ServiceError::RefusedUpdate {
                comment_id: matched.id,
            });
        }

        tracing::debug!("updating comment {}", matched.id);
        let comment_id = self
            .comments
            .update_comment(target.repository(), matched.id, target.body())
            .await?;

        self.telemetry.record(TelemetryEvent::CommentUpdated {
            repository: target.repository().full_name(),
            pull_request: target.pull_request().get(),
        });
        Ok(comment_id)
    }
}

/// First comment, in provider order, whose body contains `tag`.
fn first_tagged<'comments>(
    comments: &'comments [IssueComment],
    tag: &str,
) -> Option<&'comments IssueComment> {
    comments
        .iter()
        .find(|comment| comment.body.as_deref().is_some_and(|body| body.contains(tag)))
}
