//! Data models for the repository state and comments the proxy reads.
//!
//! Types prefixed with `Api` are internal deserialisation targets that convert
//! into public domain types.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::coordinates::CommentId;
use super::error::GitHubError;

#[cfg(feature = "test-support")]
pub mod test_support;

/// Visibility value GitHub reports for public repositories.
pub const PUBLIC_VISIBILITY: &str = "public";

/// State value GitHub reports for open pull requests.
pub const OPEN_STATE: &str = "open";

/// The user a token belongs to, as reported by `GET /user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenUser {
    /// Login of the token owner.
    pub login: String,
}

/// Repository attributes consulted during authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryInfo {
    /// `owner/repo` as GitHub reports it.
    pub full_name: Option<String>,
    /// Visibility (`public`, `private`, or `internal`).
    pub visibility: Option<String>,
}

impl RepositoryInfo {
    /// Returns true only when GitHub explicitly reports the repository as public.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.visibility.as_deref() == Some(PUBLIC_VISIBILITY)
    }
}

/// Pull request attributes consulted during authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestInfo {
    /// Pull request number.
    pub number: u64,
    /// State (e.g. open, closed).
    pub state: Option<String>,
}

impl PullRequestInfo {
    /// Returns true only when GitHub reports the pull request as open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.as_deref() == Some(OPEN_STATE)
    }
}

/// Pull request issue comment, fetched transiently while updating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueComment {
    /// Comment identifier.
    pub id: CommentId,
    /// Comment body.
    pub body: Option<String>,
    /// Author login.
    pub author: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiRepository {
    pub(super) full_name: Option<String>,
    pub(super) visibility: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequest {
    pub(super) number: u64,
    pub(super) state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiComment {
    pub(super) id: u64,
    pub(super) body: Option<String>,
    pub(super) user: Option<ApiUser>,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct ApiCommentBody<'body> {
    pub(super) body: &'body str,
}

/// Response of `GET /repos/{owner}/{repo}/contents/{path}` for a file.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiContent {
    pub(super) content: Option<String>,
    pub(super) encoding: Option<String>,
}

impl ApiContent {
    /// Decodes the base64 payload GitHub wraps at 60 columns.
    pub(super) fn decode(self, path: &str) -> Result<Vec<u8>, GitHubError> {
        let Some(content) = self.content else {
            return Err(GitHubError::Decode {
                message: format!("{path} has no content; is it a directory?"),
            });
        };

        match self.encoding.as_deref() {
            Some("base64") | None => {
                let compact: String = content
                    .chars()
                    .filter(|character| !character.is_ascii_whitespace())
                    .collect();
                STANDARD
                    .decode(compact)
                    .map_err(|error| GitHubError::Decode {
                        message: format!("content of {path}: {error}"),
                    })
            }
            Some(other) => Err(GitHubError::Decode {
                message: format!("content of {path} uses unsupported encoding {other}"),
            }),
        }
    }
}

impl TryFrom<ApiUser> for TokenUser {
    type Error = GitHubError;

    fn try_from(value: ApiUser) -> Result<Self, Self::Error> {
        match value.login {
            Some(login) if !login.is_empty() => Ok(Self { login }),
            _ => Err(GitHubError::Decode {
                message: "token user has no login".to_owned(),
            }),
        }
    }
}

impl From<ApiRepository> for RepositoryInfo {
    fn from(value: ApiRepository) -> Self {
        Self {
            full_name: value.full_name,
            visibility: value.visibility,
        }
    }
}

impl From<ApiPullRequest> for PullRequestInfo {
    fn from(value: ApiPullRequest) -> Self {
        Self {
            number: value.number,
            state: value.state,
        }
    }
}

impl From<ApiComment> for IssueComment {
    fn from(value: ApiComment) -> Self {
        Self {
            id: CommentId::new(value.id),
            body: value.body,
            author: value.user.and_then(|user| user.login),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{
        ApiComment, ApiContent, ApiUser, IssueComment, PullRequestInfo, RepositoryInfo, TokenUser,
    };
    use crate::github::coordinates::CommentId;
    use crate::github::error::GitHubError;

    #[test]
    fn api_comment_converts_into_issue_comment() {
        let api: ApiComment = serde_json::from_value(json!({
            "id": 7,
            "body": "<!-- ghcp:vet --> report",
            "user": { "login": "safedep-bot" }
        }))
        .expect("ApiComment should deserialise");

        let comment: IssueComment = api.into();
        assert_eq!(comment.id, CommentId::new(7));
        assert_eq!(comment.body.as_deref(), Some("<!-- ghcp:vet --> report"));
        assert_eq!(comment.author.as_deref(), Some("safedep-bot"));
    }

    #[test]
    fn api_comment_tolerates_deleted_user() {
        let api: ApiComment = serde_json::from_value(json!({ "id": 9, "user": null }))
            .expect("ApiComment should deserialise");

        let comment: IssueComment = api.into();
        assert!(comment.author.is_none());
        assert!(comment.body.is_none());
    }

    #[rstest]
    #[case::public(Some("public"), true)]
    #[case::private(Some("private"), false)]
    #[case::internal(Some("internal"), false)]
    #[case::missing(None, false)]
    fn repository_is_public_only_when_reported(
        #[case] visibility: Option<&str>,
        #[case] expected: bool,
    ) {
        let info = RepositoryInfo {
            full_name: Some("safedep/ghcp".to_owned()),
            visibility: visibility.map(ToOwned::to_owned),
        };

        assert_eq!(info.is_public(), expected);
    }

    #[rstest]
    #[case::open(Some("open"), true)]
    #[case::closed(Some("closed"), false)]
    #[case::missing(None, false)]
    fn pull_request_is_open_only_when_reported(
        #[case] state: Option<&str>,
        #[case] expected: bool,
    ) {
        let info = PullRequestInfo {
            number: 1,
            state: state.map(ToOwned::to_owned),
        };

        assert_eq!(info.is_open(), expected);
    }

    #[test]
    fn content_decodes_wrapped_base64() {
        let api = ApiContent {
            content: Some("dXNlczogc2FmZWRl\ncC92ZXQtYWN0aW9u\n".to_owned()),
            encoding: Some("base64".to_owned()),
        };

        let bytes = api.decode("vet.yml").expect("content should decode");
        assert_eq!(bytes, b"uses: safedep/vet-action");
    }

    #[test]
    fn content_without_payload_is_a_decode_error() {
        let api = ApiContent {
            content: None,
            encoding: None,
        };

        let result = api.decode(".github");
        assert!(
            matches!(result, Err(GitHubError::Decode { .. })),
            "expected Decode error, got {result:?}"
        );
    }

    #[test]
    fn token_user_requires_login() {
        let result = TokenUser::try_from(ApiUser { login: None });
        assert!(
            matches!(result, Err(GitHubError::Decode { .. })),
            "expected Decode error, got {result:?}"
        );
    }
}
