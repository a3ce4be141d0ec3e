//! Git error taxonomy (spec §4.4, §7).
//!
//! `libgit2` reports almost everything as one flat `git2::Error` with a
//! `class()`/`code()` pair; `classify` narrows that down to the taxonomy
//! the reconciler's retry policy actually branches on.

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("repository not found: {0}")]
    NotFound(String),

    #[error("ref not found: {0}")]
    RefNotFound(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("push rejected: {0}")]
    Rejected(String),

    #[error("refusing to create an empty commit")]
    EmptyCommit,

    #[error("commit signing failed: {0}")]
    Signing(String),

    #[error("template rendering failed: {0}")]
    Template(String),

    #[error("local filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

/// Classifies a raw `libgit2` error into the taxonomy above, based on its
/// `ErrorClass`/`ErrorCode` pair.
pub fn classify(err: git2::Error) -> GitError {
    use git2::{ErrorClass, ErrorCode};

    match (err.class(), err.code()) {
        (ErrorClass::Net, ErrorCode::Auth) | (ErrorClass::Ssh, ErrorCode::Auth) => {
            GitError::Auth(err.message().to_string())
        }
        (ErrorClass::Http, _) if err.message().to_lowercase().contains("auth") => {
            GitError::Auth(err.message().to_string())
        }
        (_, ErrorCode::NotFound) => GitError::NotFound(err.message().to_string()),
        (ErrorClass::Reference, _) => GitError::RefNotFound(err.message().to_string()),
        (_, ErrorCode::User) if err.message().to_lowercase().contains("timed out") => {
            GitError::Timeout(err.message().to_string())
        }
        (ErrorClass::Net, _) | (ErrorClass::Ssh, _) | (ErrorClass::Http, _) => {
            GitError::Transport(err.message().to_string())
        }
        _ => GitError::Transport(err.message().to_string()),
    }
}
