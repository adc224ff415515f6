//! Octocrab client construction helpers for gateway implementations.

use std::fmt;

use http::Uri;
use octocrab::Octocrab;

use crate::github::error::GitHubError;

use super::error_mapping::map_octocrab_error;

/// Public GitHub REST API base URL.
pub(crate) const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Credentials the proxy itself uses when talking to GitHub.
///
/// Client credentials take precedence over a token because OAuth app
/// credentials usually carry higher rate limits.
#[derive(Clone, PartialEq, Eq)]
pub enum GitHubCredentials {
    /// OAuth app client id and secret sent as HTTP basic auth.
    ClientCredentials {
        /// OAuth app client id.
        client_id: String,
        /// OAuth app client secret.
        client_secret: String,
    },
    /// Personal access or installation token.
    Token(String),
    /// No credentials; subject to the unauthenticated rate limit.
    Anonymous,
}

impl GitHubCredentials {
    /// Selects the strongest credential available from optional parts.
    #[must_use]
    pub fn select(
        token: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        match (client_id, client_secret, token) {
            (Some(client_id), Some(client_secret), _)
                if !client_id.is_empty() && !client_secret.is_empty() =>
            {
                Self::ClientCredentials {
                    client_id,
                    client_secret,
                }
            }
            (_, _, Some(token)) if !token.trim().is_empty() => Self::Token(token.trim().to_owned()),
            _ => Self::Anonymous,
        }
    }
}

impl fmt::Debug for GitHubCredentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientCredentials { client_id, .. } => formatter
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            Self::Token(_) => formatter.write_str("Token(<redacted>)"),
            Self::Anonymous => formatter.write_str("Anonymous"),
        }
    }
}

/// Builds an Octocrab client for the given credentials and API base URL.
///
/// # Errors
///
/// Returns `GitHubError::InvalidUrl` when the base URI cannot be parsed or
/// `GitHubError::Api` when Octocrab fails to construct a client.
pub(super) fn build_octocrab_client(
    credentials: &GitHubCredentials,
    api_base: &str,
) -> Result<Octocrab, GitHubError> {
    let base_uri: Uri = api_base
        .parse::<Uri>()
        .map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;

    let builder = match credentials {
        GitHubCredentials::ClientCredentials {
            client_id,
            client_secret,
        } => {
            tracing::debug!("using client credentials for GitHub authentication");
            Octocrab::builder().basic_auth(client_id.clone(), client_secret.clone())
        }
        GitHubCredentials::Token(token) => {
            tracing::debug!("using token for GitHub authentication");
            Octocrab::builder().personal_token(token.as_str())
        }
        GitHubCredentials::Anonymous => {
            tracing::warn!(
                "created a GitHub client without credentials; requests may be rate limited"
            );
            Octocrab::builder()
        }
    };

    builder
        .base_uri(base_uri)
        .map_err(|error| GitHubError::Api {
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}
