//! Authorization outcomes.

/// Whether a request may proceed, and why.
///
/// The reason is for audit logs and error messages only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationDecision {
    allowed: bool,
    reason: String,
}

impl AuthorizationDecision {
    /// An allow decision.
    #[must_use]
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    /// A deny decision.
    #[must_use]
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }

    /// True when the request may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Why the decision was taken.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
