//! Relay configuration loaded from CLI, environment, and files.
//!
//! Values are merged with ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – secure built-in policy
//! 2. **Configuration file** – `.ghcp.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `GHCP_*`, plus the legacy `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--bot-username`, `--github-token`, ...
//!
//! # Configuration File
//!
//! ```toml
//! allow_only_public_repositories = true
//! allow_only_own_comment_updates = true
//! bot_username = "safedep-bot"
//! github_token_audience_name = "safedep-ghcp"
//! verify_installation = true
//! installation_verifiers = [
//!     '.github/workflows/vet.yml=uses:\s+safedep/vet-action',
//! ]
//! request_timeout_seconds = 30
//! ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::authorization::{
    DEFAULT_BOT_USERNAME, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TOKEN_AUDIENCE, InstallationVerifier,
    PolicyError, ServicePolicy,
};
use crate::github::{
    GitHubCredentials, OctocrabCommentStore, OctocrabRepositoryProvider, RepositoryDataProvider,
};
use crate::identity::{IdentityResolver, OidcSignatureVerifier, TokenVerifier};
use crate::service::{CommentProxyService, CommentRelay, ServiceError};
use crate::telemetry::TelemetrySink;

/// Relay configuration supporting CLI, environment, and file sources.
///
/// Policy switches are optional so that an unset value falls back to the
/// secure default rather than to `false`.
///
/// # Environment Variables
///
/// - `GHCP_BOT_USERNAME` or `--bot-username`: Bot login comments are written as
/// - `GHCP_GITHUB_TOKEN`, `GITHUB_TOKEN`, or `--github-token`: Service token
/// - `GHCP_GITHUB_API_URL` or `--github-api-url`: REST API base URL
///
/// # Example
///
/// ```no_run
/// use ghcp::GhcpConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = GhcpConfig::load().expect("failed to load configuration");
/// let policy = config.service_policy().expect("policy should be valid");
/// assert!(policy.allow_only_public_repositories);
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "GHCP",
    discovery(
        dotfile_name = ".ghcp.toml",
        config_file_name = "ghcp.toml",
        app_name = "ghcp"
    )
)]
pub struct GhcpConfig {
    /// Refuse repositories that are not public. Defaults to true.
    ///
    /// Can be provided via:
    /// - CLI: `--allow-only-public-repositories <BOOL>`
    /// - Config file: `allow_only_public_repositories = false`
    #[ortho_config()]
    pub allow_only_public_repositories: Option<bool>,

    /// Only update comments the bot authored. Defaults to true.
    ///
    /// Can be provided via:
    /// - CLI: `--allow-only-own-comment-updates <BOOL>`
    /// - Config file: `allow_only_own_comment_updates = false`
    #[ortho_config()]
    pub allow_only_own_comment_updates: Option<bool>,

    /// Login of the bot account. Defaults to `safedep-bot`.
    ///
    /// Can be provided via:
    /// - CLI: `--bot-username <LOGIN>`
    /// - Environment: `GHCP_BOT_USERNAME`
    /// - Config file: `bot_username = "..."`
    #[ortho_config()]
    pub bot_username: Option<String>,

    /// Audience workload identity tokens must carry. Defaults to
    /// `safedep-ghcp`.
    ///
    /// Can be provided via:
    /// - CLI: `--github-token-audience-name <AUDIENCE>`
    /// - Environment: `GHCP_GITHUB_TOKEN_AUDIENCE_NAME`
    /// - Config file: `github_token_audience_name = "..."`
    #[ortho_config()]
    pub github_token_audience_name: Option<String>,

    /// Require an installation verifier to match before writing.
    ///
    /// Can be provided via:
    /// - CLI: `--verify-installation <BOOL>`
    /// - Config file: `verify_installation = true`
    #[ortho_config()]
    pub verify_installation: Option<bool>,

    /// Accept callers without a verified identity when installation
    /// verification passes.
    ///
    /// Can be provided via:
    /// - CLI: `--skip-identity-verification <BOOL>`
    /// - Config file: `skip_identity_verification = true`
    #[ortho_config()]
    pub skip_identity_verification: Option<bool>,

    /// Installation verifiers written as `path=pattern`, checked in order.
    ///
    /// When empty, the built-in vet workflow verifiers apply.
    ///
    /// Can be provided via:
    /// - Config file: `installation_verifiers = ["path=pattern", ...]`
    #[ortho_config()]
    pub installation_verifiers: Vec<String>,

    /// Disable identity-to-target matching. Test environments only.
    ///
    /// Can be provided via:
    /// - CLI: `--insecure-skip-authorization <BOOL>`
    /// - Config file: `insecure_skip_authorization = true`
    #[ortho_config()]
    pub insecure_skip_authorization: Option<bool>,

    /// Per-request deadline in seconds. Defaults to 30.
    ///
    /// Can be provided via:
    /// - CLI: `--request-timeout-seconds <SECONDS>`
    /// - Environment: `GHCP_REQUEST_TIMEOUT_SECONDS`
    /// - Config file: `request_timeout_seconds = 30`
    #[ortho_config()]
    pub request_timeout_seconds: Option<u64>,

    /// GitHub REST API base URL. Defaults to `https://api.github.com`.
    ///
    /// Can be provided via:
    /// - CLI: `--github-api-url <URL>`
    /// - Environment: `GHCP_GITHUB_API_URL`
    /// - Config file: `github_api_url = "..."`
    #[ortho_config()]
    pub github_api_url: Option<String>,

    /// Token the relay uses to act as the bot.
    ///
    /// Can be provided via:
    /// - CLI: `--github-token <TOKEN>`
    /// - Environment: `GHCP_GITHUB_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `github_token = "..."`
    #[ortho_config()]
    pub github_token: Option<String>,

    /// OAuth app client id, used together with the client secret.
    ///
    /// Can be provided via:
    /// - Environment: `GHCP_GITHUB_CLIENT_ID`
    /// - Config file: `github_client_id = "..."`
    #[ortho_config()]
    pub github_client_id: Option<String>,

    /// OAuth app client secret.
    ///
    /// Can be provided via:
    /// - Environment: `GHCP_GITHUB_CLIENT_SECRET`
    /// - Config file: `github_client_secret = "..."`
    #[ortho_config()]
    pub github_client_secret: Option<String>,
}

impl GhcpConfig {
    /// Builds the service policy, filling unset values with secure defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when a verifier entry is malformed or does not
    /// compile, or when the resulting policy is invalid.
    pub fn service_policy(&self) -> Result<ServicePolicy, PolicyError> {
        let installation_verifiers = if self.installation_verifiers.is_empty() {
            InstallationVerifier::defaults()?
        } else {
            self.installation_verifiers
                .iter()
                .map(|entry| InstallationVerifier::parse(entry))
                .collect::<Result<Vec<_>, _>>()?
        };

        let policy = ServicePolicy {
            allow_only_public_repositories: self.allow_only_public_repositories.unwrap_or(true),
            allow_only_own_comment_updates: self.allow_only_own_comment_updates.unwrap_or(true),
            bot_username: self
                .bot_username
                .clone()
                .unwrap_or_else(|| DEFAULT_BOT_USERNAME.to_owned()),
            token_audience: self
                .github_token_audience_name
                .clone()
                .unwrap_or_else(|| DEFAULT_TOKEN_AUDIENCE.to_owned()),
            verify_installation: self.verify_installation.unwrap_or(false),
            skip_identity_verification: self.skip_identity_verification.unwrap_or(false),
            installation_verifiers,
            insecure_skip_authorization: self.insecure_skip_authorization.unwrap_or(false),
            request_timeout: self.request_timeout(),
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Per-request deadline.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_seconds
            .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs)
    }

    /// Resolves the service token from configuration or the legacy
    /// `GITHUB_TOKEN` environment variable.
    #[must_use]
    pub fn resolve_token(&self) -> Option<String> {
        self.github_token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
    }

    /// Credentials the relay uses when talking to GitHub.
    #[must_use]
    pub fn credentials(&self) -> GitHubCredentials {
        GitHubCredentials::select(
            self.resolve_token(),
            self.github_client_id.clone(),
            self.github_client_secret.clone(),
        )
    }

    /// Discovers the GitHub Actions signing keys and wires a
    /// [`CommentRelay`] that verifies workload tokens against them.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::KeyDiscovery`] when the GitHub Actions key set
    /// cannot be loaded, otherwise the errors of [`GhcpConfig::relay`].
    pub async fn connect(
        &self,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Result<CommentRelay, ServiceError> {
        let verifier = OidcSignatureVerifier::github_actions().await?;
        self.relay(Arc::new(verifier), telemetry)
    }

    /// Wires a [`CommentRelay`] backed by the GitHub REST API.
    ///
    /// `verifier` checks workload identity token signatures. Whatever it
    /// accepts, the resolver only trusts tokens issued by GitHub Actions.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Configuration`] for an invalid policy and
    /// [`ServiceError::Upstream`] when a GitHub client cannot be built.
    pub fn relay(
        &self,
        verifier: Arc<dyn TokenVerifier>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Result<CommentRelay, ServiceError> {
        let policy = self.service_policy()?;
        let credentials = self.credentials();
        let api_base = self.github_api_url.as_deref();

        let provider: Arc<dyn RepositoryDataProvider> = Arc::new(
            OctocrabRepositoryProvider::for_credentials(&credentials, api_base)?,
        );
        let store = Arc::new(OctocrabCommentStore::for_credentials(&credentials, api_base)?);

        let service = CommentProxyService::new(policy, Arc::clone(&provider), store)?
            .with_telemetry(telemetry);
        Ok(CommentRelay::new(
            IdentityResolver::new(provider, verifier),
            service,
        ))
    }
}

#[cfg(test)]
mod tests;
