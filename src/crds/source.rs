//! `GitRepository`: read-only collaborator owned by the Git source
//! controller (explicitly out of scope, spec §1). This controller only
//! reads the fields it needs to perform its own clone.

use serde::{Deserialize, Serialize};

/// A typed, read-only view of the subset of `GitRepository.spec` this
/// controller cares about. Deserialized from the dynamic object returned
/// by the Kubernetes API rather than derived as a `CustomResource`, since
/// this controller never creates, updates, or owns this Kind.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct GitRepository {
    pub spec: GitRepositorySpec,
    #[serde(default)]
    pub status: GitRepositoryStatus,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct GitRepositorySpec {
    pub url: String,
    #[serde(rename = "secretRef", skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<LocalRef>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub checkout_ref: Option<super::automation::CheckoutRef>,
    #[serde(rename = "proxySecretRef", skip_serializing_if = "Option::is_none")]
    pub proxy_secret_ref: Option<LocalRef>,
    #[serde(with = "humantime_serde::option", default)]
    pub timeout: Option<std::time::Duration>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct GitRepositoryStatus {
    /// The revision (commit hash, typically) last observed by the source
    /// controller. Used purely as an informational hint; this controller
    /// always performs its own clone rather than trusting the cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_revision: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct LocalRef {
    pub name: String,
}
