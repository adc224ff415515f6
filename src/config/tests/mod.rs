//! Unit tests for configuration loading and policy construction.
//!
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `policy`: Secure defaults and verifier compilation
//! - `wiring`: Credential selection and relay construction

mod helpers;
