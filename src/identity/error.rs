//! Authentication failures.

use thiserror::Error;

/// The specific reason a credential was rejected.
///
/// Only logged and inspected by tests; callers see the generic
/// [`AuthenticationError`] message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationFailure {
    /// No credential, or an empty one after removing the `Bearer ` prefix.
    MissingCredential,
    /// GitHub could not say who owns the token.
    IdentityLookup {
        /// Provider error detail.
        message: String,
    },
    /// Signature, issuer, or expiry verification failed.
    SignatureVerification {
        /// Verifier error detail.
        message: String,
    },
    /// The verified token names an issuer other than GitHub Actions.
    UntrustedIssuer {
        /// `iss` claim, if present.
        issuer: Option<String>,
    },
    /// The token payload could not be decoded after verification.
    MalformedToken {
        /// Decoder error detail.
        message: String,
    },
}

/// A credential could not be turned into an identity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("authentication failed")]
pub struct AuthenticationError {
    kind: AuthenticationFailure,
}

impl AuthenticationError {
    /// Wraps a failure reason.
    #[must_use]
    pub const fn new(kind: AuthenticationFailure) -> Self {
        Self { kind }
    }

    /// The specific reason, for logs and tests.
    #[must_use]
    pub const fn kind(&self) -> &AuthenticationFailure {
        &self.kind
    }
}

impl From<AuthenticationFailure> for AuthenticationError {
    fn from(kind: AuthenticationFailure) -> Self {
        Self::new(kind)
    }
}
