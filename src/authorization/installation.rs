//! Installation verification: proving a target repository opted in.

use crate::github::{RepositoryCoordinates, RepositoryDataProvider};

use super::decision::AuthorizationDecision;
use super::policy::InstallationVerifier;

/// Reason given when no verifier matches.
pub const NO_VERIFIER_MATCHED: &str = "no installation verifier matched";

/// Checks `verifiers` in order against files in `repository`.
///
/// The first verifier whose file exists and matches allows the request. A
/// file that cannot be fetched, for any reason, counts as not installed and
/// the next verifier is tried.
pub async fn verify_installation(
    provider: &dyn RepositoryDataProvider,
    repository: &RepositoryCoordinates,
    verifiers: &[InstallationVerifier],
) -> AuthorizationDecision {
    for verifier in verifiers {
        let content = match provider.file_content(repository, verifier.path()).await {
            Ok(content) => content,
            Err(error) => {
                tracing::debug!(
                    "installation check {repository}: failed to fetch {}: {error}",
                    verifier.path()
                );
                continue;
            }
        };

        if verifier.matches(&content) {
            return AuthorizationDecision::allow(format!(
                "installation verified by {}",
                verifier.path()
            ));
        }
    }

    AuthorizationDecision::deny(NO_VERIFIER_MATCHED)
}
