//! Authorization policy and its construction-time invariants.

use std::fmt;
use std::time::Duration;

use regex::bytes::Regex;
use thiserror::Error;

/// Bot account that posts comments by default.
pub const DEFAULT_BOT_USERNAME: &str = "safedep-bot";

/// Audience workload identity tokens must be minted for by default.
pub const DEFAULT_TOKEN_AUDIENCE: &str = "safedep-ghcp";

/// Request deadline applied when the caller sets none.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Workflow files and the action reference that prove a repository has
/// opted in, in the order they are checked.
pub const DEFAULT_INSTALLATION_VERIFIERS: [(&str, &str); 2] = [
    (".github/workflows/vet.yml", r"uses:\s+safedep/vet-action"),
    (".github/workflows/vet-ci.yml", r"uses:\s+safedep/vet-action"),
];

/// Invalid policy combinations, detected before any request is served.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// Own-comment updates were required without naming the bot.
    #[error("bot username is required when only own comment updates are allowed")]
    MissingBotUsername,

    /// Identity verification was skipped with nothing to replace it.
    #[error(
        "skip workload identity token verification is true but no installation verifiers are provided"
    )]
    MissingInstallationVerifiers,

    /// An installation verifier pattern does not compile.
    #[error("installation verifier for {path} has an invalid pattern: {message}")]
    InvalidPattern {
        /// File the verifier inspects.
        path: String,
        /// Regex compiler detail.
        message: String,
    },

    /// An installation verifier entry is not in `path=pattern` form.
    #[error("installation verifier {entry:?} must be written as path=pattern")]
    MalformedVerifier {
        /// Offending entry.
        entry: String,
    },
}

/// A file in the target repository whose content proves installation.
#[derive(Clone)]
pub struct InstallationVerifier {
    path: String,
    pattern: Regex,
}

impl InstallationVerifier {
    /// Compiles a verifier for `path` whose content must match `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidPattern`] when `pattern` does not compile.
    pub fn new(path: &str, pattern: &str) -> Result<Self, PolicyError> {
        let compiled = Regex::new(pattern).map_err(|error| PolicyError::InvalidPattern {
            path: path.to_owned(),
            message: error.to_string(),
        })?;
        Ok(Self {
            path: path.to_owned(),
            pattern: compiled,
        })
    }

    /// Parses a `path=pattern` entry, splitting at the first `=`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::MalformedVerifier`] when there is no `=` or
    /// either side is empty, and [`PolicyError::InvalidPattern`] when the
    /// pattern does not compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use ghcp::authorization::InstallationVerifier;
    ///
    /// let verifier = InstallationVerifier::parse(r".github/workflows/vet.yml=uses:\s+safedep/vet-action")
    ///     .expect("entry should parse");
    /// assert_eq!(verifier.path(), ".github/workflows/vet.yml");
    /// assert!(verifier.matches(b"steps:\n  - uses: safedep/vet-action@v1"));
    /// ```
    pub fn parse(entry: &str) -> Result<Self, PolicyError> {
        let malformed = || PolicyError::MalformedVerifier {
            entry: entry.to_owned(),
        };
        let (path, pattern) = entry.split_once('=').ok_or_else(malformed)?;
        let trimmed_path = path.trim();
        if trimmed_path.is_empty() || pattern.is_empty() {
            return Err(malformed());
        }
        Self::new(trimmed_path, pattern)
    }

    /// The built-in verifiers for the vet GitHub Action.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidPattern`] if a built-in pattern fails to
    /// compile.
    pub fn defaults() -> Result<Vec<Self>, PolicyError> {
        DEFAULT_INSTALLATION_VERIFIERS
            .iter()
            .map(|&(path, pattern)| Self::new(path, pattern))
            .collect()
    }

    /// Repository-relative file path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Source of the content pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// True when `content` matches the pattern anywhere.
    #[must_use]
    pub fn matches(&self, content: &[u8]) -> bool {
        self.pattern.is_match(content)
    }
}

impl fmt::Debug for InstallationVerifier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("InstallationVerifier")
            .field("path", &self.path)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Rules the authorization engine and comment service enforce.
///
/// [`ServicePolicy::default`] is secure: public repositories only, own
/// comments only, and every caller must prove its identity. It carries no
/// installation verifiers; see [`InstallationVerifier::defaults`].
#[derive(Debug, Clone)]
pub struct ServicePolicy {
    /// Refuse to comment on repositories that are not public.
    pub allow_only_public_repositories: bool,
    /// Only update comments the bot itself authored.
    pub allow_only_own_comment_updates: bool,
    /// Login of the bot account comments are written as.
    pub bot_username: String,
    /// Audience workload identity tokens must carry.
    pub token_audience: String,
    /// Additionally require an installation verifier to match.
    pub verify_installation: bool,
    /// Accept callers without a verified identity when installation
    /// verification passes.
    pub skip_identity_verification: bool,
    /// Installation proofs, checked in order.
    pub installation_verifiers: Vec<InstallationVerifier>,
    /// Disable identity-to-target matching. Test environments only.
    pub insecure_skip_authorization: bool,
    /// Deadline applied to a request when the caller sets none.
    pub request_timeout: Duration,
}

impl Default for ServicePolicy {
    fn default() -> Self {
        Self {
            allow_only_public_repositories: true,
            allow_only_own_comment_updates: true,
            bot_username: DEFAULT_BOT_USERNAME.to_owned(),
            token_audience: DEFAULT_TOKEN_AUDIENCE.to_owned(),
            verify_installation: false,
            skip_identity_verification: false,
            installation_verifiers: Vec::new(),
            insecure_skip_authorization: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ServicePolicy {
    /// Checks invariants that must hold before serving requests.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::MissingBotUsername`] when own-comment updates are
    /// required without a bot username, and
    /// [`PolicyError::MissingInstallationVerifiers`] when identity
    /// verification is skipped without any installation verifier.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.allow_only_own_comment_updates && self.bot_username.trim().is_empty() {
            return Err(PolicyError::MissingBotUsername);
        }
        if self.skip_identity_verification && self.installation_verifiers.is_empty() {
            return Err(PolicyError::MissingInstallationVerifiers);
        }
        Ok(())
    }

    /// True when an installation verifier must match before writing.
    #[must_use]
    pub const fn requires_installation_check(&self) -> bool {
        self.verify_installation || self.skip_identity_verification
    }
}
