//! Authorization of comment requests.
//!
//! The [`AuthorizationEngine`] dispatches on the caller's
//! [`TokenType`](crate::identity::TokenType):
//!
//! - workload identity tokens must name the requested repository, owner,
//!   and configured audience in their claims;
//! - installation tokens are checked against live repository and pull
//!   request state;
//! - personal access tokens are only accepted when installation
//!   verification is enabled.
//!
//! Installation verification can be layered on top of any of these, or
//! replace identity verification entirely.

pub mod decision;
pub mod engine;
pub mod installation;
pub mod policy;
pub mod request;

pub use decision::AuthorizationDecision;
pub use engine::AuthorizationEngine;
pub use installation::{NO_VERIFIER_MATCHED, verify_installation};
pub use policy::{
    DEFAULT_BOT_USERNAME, DEFAULT_INSTALLATION_VERIFIERS, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_TOKEN_AUDIENCE, InstallationVerifier, PolicyError, ServicePolicy,
};
pub use request::{AuthorizationRequest, CommentRequest, RequestError};

#[cfg(test)]
mod tests;
