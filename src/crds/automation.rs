//! `ImageUpdateAutomation`: the reconciled object.
//!
//! Mirrors the data model in the design document section by section:
//! `source_ref`, `git`, `update`, `interval`, `policy_selector`, `suspend`
//! on the spec side; `last_automation_run_time`, `last_push_commit`,
//! `last_push_time`, `observed_generation`, `observed_policies`,
//! `observed_source_revision`, `conditions` on the status side.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, LabelSelector, Time};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// # ImageUpdateAutomation
/// Declares that one or more marked fields in YAML manifests under a Git
/// repository path should be kept pointed at the latest image resolved by
/// a set of `ImagePolicy` objects.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "image.toolkit.fluxcd.io",
    version = "v1beta2",
    kind = "ImageUpdateAutomation",
    namespaced,
    status = "ImageUpdateAutomationStatus",
    printcolumn = r#"{"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#,
    printcolumn = r#"{"name":"Status", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].message"}"#,
    shortname = "iua"
)]
pub struct ImageUpdateAutomationSpec {
    /// Reference to the `GitRepository` object that owns the Git source.
    #[serde(rename = "sourceRef")]
    pub source_ref: SourceReference,

    /// Git checkout/commit/push configuration.
    pub git: GitSpec,

    /// How and where to apply setters.
    pub update: UpdateStrategy,

    /// Minimum wall time between successful runs, e.g. `"5m"`.
    #[serde(with = "humantime_serde")]
    pub interval: std::time::Duration,

    /// Optional label filter applied to candidate `ImagePolicy` objects.
    #[serde(rename = "policySelector", skip_serializing_if = "Option::is_none")]
    pub policy_selector: Option<LabelSelector>,

    /// When true, reconciliation is a no-op.
    #[serde(default)]
    pub suspend: bool,
}

/// A namespaced reference to an external object.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct SourceReference {
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct GitSpec {
    #[serde(rename = "checkout", skip_serializing_if = "Option::is_none")]
    pub checkout_ref: Option<CheckoutRef>,
    pub commit: CommitSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<PushSpec>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default)]
pub struct CheckoutRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semver: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct CommitSpec {
    pub author: CommitAuthor,
    #[serde(rename = "signingKey", skip_serializing_if = "Option::is_none")]
    pub signing_key: Option<SigningKeyRef>,
    #[serde(rename = "messageTemplate", skip_serializing_if = "Option::is_none")]
    pub message_template: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct SigningKeyRef {
    /// Name of the Secret holding `git.asc` (and optionally `passphrase`).
    #[serde(rename = "secretRef")]
    pub secret_ref: String,
    #[serde(rename = "passphraseKey", skip_serializing_if = "Option::is_none")]
    pub passphrase_key: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct PushSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refspec: Option<String>,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct UpdateStrategy {
    /// Currently the only supported strategy.
    pub strategy: String,
    /// Sub-path under the repository root to restrict the setter walk to.
    #[serde(default)]
    pub path: String,
}

/// The observed state of the `ImageUpdateAutomation` resource, managed
/// exclusively by the controller.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default)]
pub struct ImageUpdateAutomationStatus {
    #[serde(rename = "lastAutomationRunTime", skip_serializing_if = "Option::is_none")]
    pub last_automation_run_time: Option<Time>,

    #[serde(rename = "lastPushCommit", skip_serializing_if = "Option::is_none")]
    pub last_push_commit: Option<String>,

    #[serde(rename = "lastPushTime", skip_serializing_if = "Option::is_none")]
    pub last_push_time: Option<Time>,

    #[serde(rename = "observedGeneration", default = "default_observed_generation")]
    pub observed_generation: i64,

    #[serde(rename = "observedPolicies", default)]
    pub observed_policies: BTreeMap<String, ObservedPolicy>,

    #[serde(rename = "observedSourceRevision", skip_serializing_if = "Option::is_none")]
    pub observed_source_revision: Option<String>,

    /// Consecutive failed reconciliations since the last success, reset to
    /// zero on every successful run. Drives `error_policy`'s exponential
    /// backoff.
    #[serde(rename = "failureCount", default)]
    pub failure_count: u32,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

fn default_observed_generation() -> i64 {
    -1
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
pub struct ObservedPolicy {
    #[serde(rename = "imageName")]
    pub image_name: String,
    pub tag: String,
}
