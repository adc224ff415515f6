//! Identity wrappers for the repository and pull request a caller targets.

use std::fmt;

use super::error::CoordinateError;

/// GitHub names are ASCII letters, digits, `.`, `-` and `_`. Anything else,
/// or a bare `.`/`..`, would change the meaning of the REST paths built from
/// them.
fn is_path_safe_name(value: &str) -> bool {
    value != "."
        && value != ".."
        && value.chars().all(|character| {
            character.is_ascii_alphanumeric() || matches!(character, '.' | '-' | '_')
        })
}

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    /// Validates that the owner is a non-blank GitHub name.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::MissingOwner`] when the value is blank and
    /// [`CoordinateError::InvalidOwner`] when it is not a path-safe name.
    pub fn new(value: &str) -> Result<Self, CoordinateError> {
        if value.trim().is_empty() {
            return Err(CoordinateError::MissingOwner);
        }
        if !is_path_safe_name(value) {
            return Err(CoordinateError::InvalidOwner);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Validates that the repository name is a non-blank GitHub name.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::MissingRepository`] when the value is blank
    /// and [`CoordinateError::InvalidRepository`] when it is not a path-safe
    /// name.
    pub fn new(value: &str) -> Result<Self, CoordinateError> {
        if value.trim().is_empty() {
            return Err(CoordinateError::MissingRepository);
        }
        if !is_path_safe_name(value) {
            return Err(CoordinateError::InvalidRepository);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Wraps a non-zero pull request number.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::InvalidPullRequestNumber`] for zero.
    pub const fn new(value: u64) -> Result<Self, CoordinateError> {
        if value == 0 {
            return Err(CoordinateError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Parses the decimal form callers send over the wire.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::InvalidPullRequestNumber`] when the value is
    /// not a positive integer.
    pub fn parse(value: &str) -> Result<Self, CoordinateError> {
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| CoordinateError::InvalidPullRequestNumber)
            .and_then(Self::new)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PullRequestNumber {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Identifier GitHub assigns to an issue comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommentId(u64);

impl CommentId {
    /// Wraps a raw comment identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Owner and name of a repository, used to build REST paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryCoordinates {
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryCoordinates {
    /// Creates coordinates from validated parts.
    #[must_use]
    pub const fn new(owner: RepositoryOwner, repository: RepositoryName) -> Self {
        Self { owner, repository }
    }

    /// Validates raw owner and repository strings.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::MissingOwner`] or
    /// [`CoordinateError::MissingRepository`] when either part is blank.
    pub fn parse(owner: &str, repository: &str) -> Result<Self, CoordinateError> {
        Ok(Self::new(
            RepositoryOwner::new(owner)?,
            RepositoryName::new(repository)?,
        ))
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Returns `owner/repo`, the form GitHub uses in OIDC `repository` claims.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.repository.as_str())
    }

    pub(crate) fn repository_path(&self) -> String {
        format!("/repos/{}", self.full_name())
    }

    pub(crate) fn pull_request_path(&self, number: PullRequestNumber) -> String {
        format!("{}/pulls/{number}", self.repository_path())
    }

    pub(crate) fn comments_path(&self, number: PullRequestNumber) -> String {
        format!("{}/issues/{number}/comments", self.repository_path())
    }

    pub(crate) fn comment_path(&self, comment: CommentId) -> String {
        format!("{}/issues/comments/{comment}", self.repository_path())
    }

    pub(crate) fn contents_path(&self, path: &str) -> String {
        format!(
            "{}/contents/{}",
            self.repository_path(),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Display for RepositoryCoordinates {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}/{}",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }
}
