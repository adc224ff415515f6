//! The comment relay service.
//!
//! [`CommentRelay`] is the entry point a transport calls: it extracts the
//! bearer credential, resolves it into an identity, and hands the request to
//! [`CommentProxyService`], which authorizes it and writes the comment.

pub mod comments;
pub mod error;
pub mod relay;

pub use comments::CommentProxyService;
pub use error::ServiceError;
pub use relay::CommentRelay;

#[cfg(test)]
mod tests;
