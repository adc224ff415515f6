//! Syntactic routing of raw credentials to a verification path.

use super::TokenType;

/// Literal prefixes GitHub puts on the tokens it issues.
///
/// See <https://github.blog/changelog/2021-03-31-authentication-token-format-updates-are-generally-available/>.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPrefix {
    /// `ghp_`: personal access token.
    Personal,
    /// `gho_`: OAuth app user token.
    OAuth,
    /// `ghu_`: GitHub App user-to-server token.
    UserToServer,
    /// `ghs_`: GitHub App server-to-server token, which includes the
    /// `GITHUB_TOKEN` minted for each Actions job.
    ServerToServer,
}

impl TokenPrefix {
    /// Every prefix GitHub issues.
    pub const ALL: [Self; 4] = [
        Self::Personal,
        Self::OAuth,
        Self::UserToServer,
        Self::ServerToServer,
    ];

    /// The literal prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "ghp_",
            Self::OAuth => "gho_",
            Self::UserToServer => "ghu_",
            Self::ServerToServer => "ghs_",
        }
    }

    /// Token type an identity resolved from this prefix carries.
    #[must_use]
    pub const fn token_type(self) -> TokenType {
        match self {
            Self::ServerToServer => TokenType::ActionToken,
            Self::Personal | Self::OAuth | Self::UserToServer => TokenType::PersonalAccessToken,
        }
    }
}

/// Verification path a credential is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// Opaque GitHub token, checked by asking GitHub who owns it.
    PersonalAccess(TokenPrefix),
    /// Anything else, presumed to be a signed OIDC token.
    SignedOidc,
}

/// Classifies a raw credential by its prefix.
///
/// This never authenticates anything; it only picks the path that will.
///
/// # Examples
///
/// ```
/// use ghcp::identity::{TokenClass, TokenPrefix, classify};
///
/// assert_eq!(
///     classify("ghp_abc123"),
///     TokenClass::PersonalAccess(TokenPrefix::Personal)
/// );
/// assert_eq!(classify("eyJhbGciOiJSUzI1NiJ9.e30.sig"), TokenClass::SignedOidc);
/// ```
#[must_use]
pub fn classify(raw: &str) -> TokenClass {
    TokenPrefix::ALL
        .into_iter()
        .find(|prefix| raw.starts_with(prefix.as_str()))
        .map_or(TokenClass::SignedOidc, TokenClass::PersonalAccess)
}
