//! Unit tests for the identity module.

mod oidc;
