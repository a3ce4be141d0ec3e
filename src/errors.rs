//! Top-level error type for the controller.
//!
//! Every reconciliation boundary collapses whatever went wrong into one of
//! these variants before it is allowed to touch a `Condition` or an event;
//! the full chain (via `source()`) only ever reaches `tracing`.

use kube::runtime::finalizer::Error as FinalizerError;

/// The error taxonomy from the reconciliation design: each variant maps to
/// exactly one retry policy in `error_policy`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid spec, missing required field, bad update path. No retry
    /// until the spec changes.
    #[error("invalid automation configuration: {0}")]
    InvalidConfiguration(String),

    /// Missing source object, missing secret, cross-namespace denied.
    /// Retried with backoff since the collaborator may still appear.
    #[error("access error: {0}")]
    Access(String),

    /// Network, TLS, SSH handshake, timeout while talking to the Git
    /// remote.
    #[error("git transport error: {0}")]
    GitTransport(#[from] crate::git::error::GitError),

    /// Push rejected (protected branch, non-fast-forward without force).
    #[error("git protocol error: {0}")]
    GitProtocol(String),

    /// YAML parse error, marker parse error, template render error. No
    /// retry until the spec or the repository content changes.
    #[error("invalid update configuration: {0}")]
    InvalidUpdate(String),

    /// Disk I/O, cancellation, or anything else transient. Retried at
    /// min-backoff.
    #[error("transient error: {0}")]
    Transient(String),

    /// The Kubernetes API itself.
    #[error("kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Propagated from `kube_runtime::finalizer`, which wraps whatever the
    /// `Apply`/`Cleanup` closure returned.
    #[error("finalizer error: {0}")]
    Finalizer(Box<FinalizerError<Error>>),
}

impl From<FinalizerError<Error>> for Error {
    fn from(value: FinalizerError<Error>) -> Self {
        Error::Finalizer(Box::new(value))
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Transient(value.to_string())
    }
}

impl Error {
    /// The `reason` string recorded on the `Ready` condition, following the
    /// control-plane convention enumerated in the API surface.
    pub fn reason(&self) -> &'static str {
        match self {
            Error::InvalidConfiguration(_) => "InvalidSourceConfiguration",
            Error::Access(_) => "AccessDenied",
            Error::GitTransport(_) | Error::GitProtocol(_) => "GitOperationFailed",
            Error::InvalidUpdate(_) => "InvalidUpdateConfiguration",
            Error::Transient(_) => "ReconciliationFailed",
            Error::Kube(_) => "ReconciliationFailed",
            Error::Finalizer(_) => "ReconciliationFailed",
        }
    }

    /// Whether this error is worth retrying at all, or whether the
    /// operator must wait for the spec itself to change.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Error::InvalidConfiguration(_) | Error::InvalidUpdate(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
