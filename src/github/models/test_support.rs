//! Test helpers for constructing `IssueComment` fixtures.
//!
//! # Examples
//!
//! ```
//! use ghcp::github::models::test_support::comment;
//!
//! let existing = comment(1, "report <!-- ghcp:vet -->", "safedep-bot");
//! assert_eq!(existing.author.as_deref(), Some("safedep-bot"));
//! ```

use super::IssueComment;
use crate::github::coordinates::CommentId;

/// Constructs an `IssueComment` with id, body, and author set.
#[must_use]
pub fn comment(id: u64, body: &str, author: &str) -> IssueComment {
    IssueComment {
        id: CommentId::new(id),
        body: Some(body.to_owned()),
        author: Some(author.to_owned()),
    }
}

/// Constructs an `IssueComment` whose author account no longer exists.
#[must_use]
pub fn anonymous_comment(id: u64, body: &str) -> IssueComment {
    IssueComment {
        id: CommentId::new(id),
        body: Some(body.to_owned()),
        author: None,
    }
}
