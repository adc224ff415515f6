//! Full request handling: credential, identity, authorization, write.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, timeout_at};

use crate::authorization::CommentRequest;
use crate::github::CommentId;
use crate::identity::{IdentityResolver, bearer_token};

use super::comments::CommentProxyService;
use super::error::ServiceError;

/// Resolves the caller and relays its comment, all under one deadline.
pub struct CommentRelay {
    resolver: IdentityResolver,
    service: CommentProxyService,
}

impl CommentRelay {
    /// Combines a resolver with the service it feeds.
    #[must_use]
    pub const fn new(resolver: IdentityResolver, service: CommentProxyService) -> Self {
        Self { resolver, service }
    }

    /// The underlying comment service.
    #[must_use]
    pub const fn service(&self) -> &CommentProxyService {
        &self.service
    }

    /// Handles one request.
    ///
    /// `authorization` is the raw `Authorization` header. A credential is
    /// always required here, whatever the policy. When `deadline` is `None`
    /// the policy's request timeout applies.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unauthenticated`] for a missing or invalid
    /// credential, [`ServiceError::DeadlineExceeded`] when the deadline
    /// passes, and otherwise whatever
    /// [`CommentProxyService::execute`] returns.
    pub async fn handle(
        &self,
        authorization: Option<&str>,
        request: &CommentRequest,
        deadline: Option<Instant>,
    ) -> Result<CommentId, ServiceError> {
        let effective_deadline =
            deadline.or_else(|| deadline_after(self.service.policy().request_timeout));

        let result = within(effective_deadline, async {
            let credential = bearer_token(authorization)?;
            let identity = self.resolver.resolve(credential).await?;
            tracing::debug!("resolved {:?} identity", identity.token_type());
            self.service.run(Some(&identity), request).await
        })
        .await;

        self.service.record_outcome(&result);
        result
    }
}

fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

async fn within<F>(deadline: Option<Instant>, work: F) -> Result<CommentId, ServiceError>
where
    F: Future<Output = Result<CommentId, ServiceError>>,
{
    match deadline {
        Some(at) => timeout_at(at, work)
            .await
            .unwrap_or(Err(ServiceError::DeadlineExceeded)),
        None => work.await,
    }
}
