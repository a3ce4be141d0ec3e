//! The reconciler for `ImageUpdateAutomation` (spec §4.5).
//!
//! Every reconciliation: loads the automation, checks the finalizer and
//! `suspend` gate, resolves the source and its policies, clones into a
//! fresh scratch directory, runs the setter engine, and if anything
//! changed, commits and pushes, updating `status` either way.
//!
//! `git2` is synchronous, so every call into `crate::git` is dispatched
//! onto a blocking thread via `tokio::task::spawn_blocking`, bounded by a
//! `tokio::time::timeout` taken from the source's configured timeout (or
//! `DEFAULT_GIT_TIMEOUT`) so a wedged transport can't pin a worker thread
//! forever.

use crate::acl;
use crate::config::FeatureGates;
use crate::context::Context;
use crate::crds::automation::{
    CheckoutRef, ImageUpdateAutomation, ImageUpdateAutomationStatus, ObservedPolicy, SigningKeyRef,
};
use crate::crds::{GitRepository, ImagePolicy};
use crate::errors::Error;
use crate::git;
use crate::git::auth::AccessConfig;
use crate::git::commit::SigningKey;
use crate::screening;
use crate::setters::{self, PolicyTable, ResolvedPolicy as EngineResolvedPolicy, SetterResult};
use crate::template;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};
use kube::api::{Api, ApiResource, DynamicObject, Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::runtime::events::{Event, EventType, Recorder};
use kube::runtime::finalizer::{finalizer, Event as FinalizerEvent};
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const FINALIZER: &str = "image-automation.toolkit.fluxcd.io/finalizer";

/// Applied when `GitRepositorySpec.timeout` is unset.
const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(300);

pub async fn reconcile(
    automation: Arc<ImageUpdateAutomation>,
    ctx: Arc<Context>,
) -> Result<Action, Error> {
    let ns = automation
        .namespace()
        .ok_or_else(|| Error::InvalidConfiguration("object has no namespace".to_string()))?;
    let api: Api<ImageUpdateAutomation> = Api::namespaced(ctx.client.clone(), &ns);

    let result = finalizer(&api, FINALIZER, automation.clone(), |event| async {
        match event {
            FinalizerEvent::Apply(automation) => apply(automation, &ctx).await,
            FinalizerEvent::Cleanup(automation) => cleanup(automation, &ctx).await,
        }
    })
    .await;

    match result {
        Ok(action) => Ok(action),
        Err(finalizer_error) => {
            let error = Error::from(finalizer_error);
            report_failure(&ctx, &automation, &error).await;
            Err(error)
        }
    }
}

/// Requeues retryable errors with exponential backoff bounded by
/// `ProcessConfig.min_retry_delay`/`max_retry_delay`, keyed off the
/// `failure_count` the reconciler itself maintains on status. Errors that
/// can't be fixed by retrying (bad spec, bad update content) wait for the
/// next spec change instead.
pub fn error_policy(
    automation: Arc<ImageUpdateAutomation>,
    error: &Error,
    ctx: Arc<Context>,
) -> Action {
    tracing::error!(
        automation = %automation.name_any(),
        %error,
        "reconciliation failed"
    );

    if !error.is_retryable() {
        return Action::await_change();
    }

    let attempt = automation.status.as_ref().map(|s| s.failure_count).unwrap_or(0);
    let delay = backoff_delay(ctx.config.min_retry_delay, ctx.config.max_retry_delay, attempt);
    Action::requeue(delay)
}

fn backoff_delay(min: Duration, max: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
    min.checked_mul(factor).unwrap_or(max).min(max)
}

/// A clone doesn't own a remote delete hook; cleanup is just removing the
/// finalizer, since this controller never leaves external state keyed on
/// the automation's existence (the Git repository outlives it).
async fn cleanup(automation: Arc<ImageUpdateAutomation>, _ctx: &Arc<Context>) -> Result<Action, Error> {
    tracing::info!(automation = %automation.name_any(), "finalizing");
    Ok(Action::await_change())
}

async fn apply(automation: Arc<ImageUpdateAutomation>, ctx: &Arc<Context>) -> Result<Action, Error> {
    let ns = automation
        .namespace()
        .ok_or_else(|| Error::InvalidConfiguration("object has no namespace".to_string()))?;
    let name = automation.name_any();
    let spec = &automation.spec;

    if spec.suspend {
        tracing::debug!(automation = %name, "suspended, skipping reconciliation");
        let status = suspended_status(&automation);
        patch_status(ctx, &ns, &name, status).await?;
        return Ok(Action::await_change());
    }

    let source_ns = spec
        .source_ref
        .namespace
        .clone()
        .unwrap_or_else(|| ns.clone());
    acl::check_cross_namespace(&ns, &source_ns, ctx.config.no_cross_namespace_refs)?;

    let source = load_source(ctx, &source_ns, &spec.source_ref.name).await?;
    let policies = load_policies(ctx, &ns, spec.policy_selector.as_ref()).await?;

    let observed_source_revision = source
        .status
        .artifact_revision
        .clone()
        .unwrap_or_default();
    let observed_policies = observed_policy_map(&policies);

    let unchanged = automation.status.as_ref().is_some_and(|status| {
        status.observed_source_revision.as_deref() == Some(observed_source_revision.as_str())
            && status.observed_policies == observed_policies
    });
    if unchanged {
        tracing::debug!(automation = %name, "source and policies unchanged since last run, skipping");
        return Ok(Action::requeue(spec.interval));
    }

    let workdir = tempfile::tempdir().map_err(Error::from)?;
    let access = resolve_access(ctx, &source, &ns, workdir.path()).await?;
    let signing_key = resolve_signing_key(ctx, &ns, spec.git.commit.signing_key.as_ref()).await?;

    let shallow = ctx.config.feature_gates().is_enabled(FeatureGates::GIT_SHALLOW_CLONE)
        && checkout_is_shallow_compatible(source.spec.checkout_ref.as_ref());
    let timeout = source.spec.timeout.unwrap_or(DEFAULT_GIT_TIMEOUT);

    let outcome = run_in_workdir(
        workdir.path().to_path_buf(),
        automation.clone(),
        source.clone(),
        access,
        policies.clone(),
        signing_key,
        shallow,
        timeout,
    )
    .await?;

    if let Some(outcome) = &outcome {
        emit_event(
            ctx,
            &automation,
            Event {
                type_: EventType::Normal,
                reason: "GitOperationSucceeded".to_string(),
                note: Some(outcome.message.clone()),
                action: "Push".to_string(),
                secondary: None,
            },
        )
        .await;
    }

    let status = success_status(&automation, &observed_source_revision, &observed_policies, outcome.as_ref());
    patch_status(ctx, &ns, &name, status).await?;

    Ok(Action::requeue(spec.interval))
}

/// A clone is shallow-clone-compatible only when it will check out
/// whatever `depth(1)` already fetched, i.e. no checkout ref at all, or a
/// branch ref the builder resolves during the clone itself. Tag, commit,
/// and semver checkout refs are resolved *after* the clone completes and
/// may not exist in a depth-1 history, so they force a full clone.
fn checkout_is_shallow_compatible(checkout_ref: Option<&CheckoutRef>) -> bool {
    match checkout_ref {
        None => true,
        Some(r) => r.tag.is_none() && r.commit.is_none() && r.semver.is_none(),
    }
}

struct PushOutcome {
    commit: String,
    message: String,
}

/// Runs the clone/setters/commit/push sequence on a blocking thread, since
/// every step but the final Kubernetes status patch is synchronous `git2`
/// or file I/O work. Bounded by `timeout`: if the blocking task hasn't
/// finished by then, the reconciliation fails with `GitError::Timeout`
/// (the task itself keeps running to completion on its worker thread,
/// since `git2` offers no cooperative cancellation).
async fn run_in_workdir(
    workdir: PathBuf,
    automation: Arc<ImageUpdateAutomation>,
    source: GitRepository,
    access: AccessConfig,
    policies: PolicyTable,
    signing_key: Option<SigningKey>,
    shallow: bool,
    timeout: Duration,
) -> Result<Option<PushOutcome>, Error> {
    let task = tokio::task::spawn_blocking(move || {
        run_in_workdir_blocking(
            &workdir,
            &automation,
            &source,
            &access,
            &policies,
            signing_key.as_ref(),
            shallow,
        )
    });

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(Error::Transient(format!("git task panicked: {join_error}"))),
        Err(_) => Err(Error::GitTransport(crate::git::error::GitError::Timeout(format!(
            "git operations exceeded {timeout:?}"
        )))),
    }
}

fn run_in_workdir_blocking(
    workdir: &std::path::Path,
    automation: &ImageUpdateAutomation,
    source: &GitRepository,
    access: &AccessConfig,
    policies: &PolicyTable,
    signing_key: Option<&SigningKey>,
    shallow: bool,
) -> Result<Option<PushOutcome>, Error> {
    let spec = &automation.spec;
    let ns = automation.namespace().unwrap_or_default();

    let repo = git::clone::clone(
        &source.spec.url,
        source.spec.checkout_ref.as_ref(),
        workdir,
        access,
        shallow,
    )
    .map_err(Error::GitTransport)?;

    let update_root = if spec.update.path.is_empty() {
        workdir.to_path_buf()
    } else {
        workdir.join(&spec.update.path)
    };

    let screened = screening::screen(&update_root)
        .map_err(|e| Error::InvalidUpdate(e.to_string()))?;

    let (result, writes) = setters::apply(&screened, policies, &ns)
        .map_err(|e| Error::InvalidUpdate(e.to_string()))?;

    if !result.has_changes() {
        return Ok(None);
    }

    for (relative, bytes) in &writes {
        let absolute = update_root.join(relative);
        std::fs::write(&absolute, bytes).map_err(Error::from)?;
    }

    let mut message = render_message(automation, &result)?;
    let commit = git::commit::commit_all(
        &repo,
        git::commit::CommitAuthor {
            name: &spec.git.commit.author.name,
            email: &spec.git.commit.author.email,
        },
        &message,
        signing_key,
    );

    match commit {
        Ok(_) => {}
        Err(crate::git::error::GitError::EmptyCommit) => return Ok(None),
        Err(e) => return Err(Error::GitTransport(e)),
    }

    let checkout_ref_name = spec
        .git
        .checkout_ref
        .as_ref()
        .and_then(|r| r.branch.as_deref())
        .unwrap_or("HEAD");

    let decision = git::push::decide(&repo, checkout_ref_name, spec.git.push.as_ref(), access)
        .map_err(Error::GitTransport)?;

    let decision = match decision {
        git::push::PushDecision::SyncAndReplay { branch, remote_head } => {
            git::push::reset_local_to(&repo, &branch, remote_head).map_err(Error::GitTransport)?;
            let (result, writes) = setters::apply(&screening::screen(&update_root).map_err(|e| Error::InvalidUpdate(e.to_string()))?, policies, &ns)
                .map_err(|e| Error::InvalidUpdate(e.to_string()))?;
            if !result.has_changes() {
                return Ok(None);
            }
            for (relative, bytes) in &writes {
                std::fs::write(update_root.join(relative), bytes).map_err(Error::from)?;
            }
            message = render_message(automation, &result)?;
            git::commit::commit_all(
                &repo,
                git::commit::CommitAuthor {
                    name: &spec.git.commit.author.name,
                    email: &spec.git.commit.author.email,
                },
                &message,
                signing_key,
            )
            .map_err(Error::GitTransport)?;
            git::push::decide(&repo, checkout_ref_name, spec.git.push.as_ref(), access).map_err(Error::GitTransport)?
        }
        other => other,
    };

    let options = spec
        .git
        .push
        .as_ref()
        .map(|p| p.options.clone())
        .unwrap_or_default();
    let refspec = spec.git.push.as_ref().and_then(|p| p.refspec.as_deref());

    let pushed = git::push::execute(&repo, &decision, refspec, &options, access).map_err(Error::GitTransport)?;

    Ok(Some(PushOutcome {
        commit: pushed.to_string(),
        message,
    }))
}

fn render_message(automation: &ImageUpdateAutomation, result: &SetterResult) -> Result<String, Error> {
    let template_str = automation
        .spec
        .git
        .commit
        .message_template
        .as_deref()
        .unwrap_or(template::DEFAULT_TEMPLATE);

    template::render(
        template_str,
        &automation.namespace().unwrap_or_default(),
        &automation.name_any(),
        result,
        &automation.spec.git.commit.values,
    )
    .map_err(|e| Error::InvalidUpdate(e.to_string()))
}

fn git_repository_resource() -> ApiResource {
    ApiResource {
        group: "source.toolkit.fluxcd.io".to_string(),
        version: "v1".to_string(),
        api_version: "source.toolkit.fluxcd.io/v1".to_string(),
        kind: "GitRepository".to_string(),
        plural: "gitrepositories".to_string(),
    }
}

fn image_policy_resource() -> ApiResource {
    ApiResource {
        group: "image.toolkit.fluxcd.io".to_string(),
        version: "v1beta2".to_string(),
        api_version: "image.toolkit.fluxcd.io/v1beta2".to_string(),
        kind: "ImagePolicy".to_string(),
        plural: "imagepolicies".to_string(),
    }
}

async fn load_source(ctx: &Arc<Context>, ns: &str, name: &str) -> Result<GitRepository, Error> {
    let api: Api<DynamicObject> = Api::namespaced_with(ctx.client.clone(), ns, &git_repository_resource());

    let object = api
        .get(name)
        .await
        .map_err(|e| Error::Access(format!("fetching GitRepository {ns}/{name}: {e}")))?;

    let value = serde_json::to_value(&object).map_err(|e| Error::InvalidConfiguration(e.to_string()))?;
    serde_json::from_value(value)
        .map_err(|e| Error::InvalidConfiguration(format!("GitRepository {ns}/{name} has an unexpected shape: {e}")))
}

async fn load_policies(
    ctx: &Arc<Context>,
    ns: &str,
    selector: Option<&k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector>,
) -> Result<PolicyTable, Error> {
    let api: Api<DynamicObject> = Api::namespaced_with(ctx.client.clone(), ns, &image_policy_resource());

    let mut lp = kube::api::ListParams::default();
    if let Some(selector) = selector {
        if let Some(labels) = selector_to_string(selector) {
            lp = lp.labels(&labels);
        }
    }

    let list = api
        .list(&lp)
        .await
        .map_err(|e| Error::Access(format!("listing ImagePolicy objects in {ns}: {e}")))?;

    let mut table = PolicyTable::new();
    for object in list.items {
        let name = object.metadata.name.clone().unwrap_or_default();
        let value = match serde_json::to_value(&object) {
            Ok(v) => v,
            Err(_) => continue,
        };
        let policy: ImagePolicy = match serde_json::from_value(value) {
            Ok(p) => p,
            Err(_) => continue,
        };
        let Some(latest_ref) = &policy.status.latest_ref else {
            continue;
        };
        table.insert(
            (ns.to_string(), name),
            EngineResolvedPolicy {
                latest_image: policy.latest_image().unwrap_or_default().to_string(),
                latest_tag: latest_ref.tag.clone(),
            },
        );
    }
    Ok(table)
}

fn selector_to_string(selector: &k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector) -> Option<String> {
    let parts: Vec<String> = selector
        .match_labels
        .as_ref()?
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

async fn resolve_access(
    ctx: &Arc<Context>,
    source: &GitRepository,
    ns: &str,
    workdir: &Path,
) -> Result<AccessConfig, Error> {
    let mut access = AccessConfig {
        timeout: source.spec.timeout,
        ssh_hostkey_algos: ctx.config.ssh_hostkey_algos.clone(),
        ssh_kex_algos: ctx.config.ssh_kex_algos.clone(),
        ..AccessConfig::default()
    };

    if let Some(secret_ref) = &source.spec.secret_ref {
        let secrets: Api<Secret> = Api::namespaced(ctx.client.clone(), ns);
        let secret = secrets
            .get(&secret_ref.name)
            .await
            .map_err(|e| Error::Access(format!("fetching credentials secret {}: {e}", secret_ref.name)))?;
        access.credentials = git::auth::Credentials::from_secret(&secret);
        access.ca_bundle_path = write_ca_bundle(workdir, &secret)?;
    }

    if let Some(proxy_ref) = &source.spec.proxy_secret_ref {
        let secrets: Api<Secret> = Api::namespaced(ctx.client.clone(), ns);
        let secret = secrets
            .get(&proxy_ref.name)
            .await
            .map_err(|e| Error::Access(format!("fetching proxy secret {}: {e}", proxy_ref.name)))?;
        access.proxy = git::auth::ProxyConfig::from_secret(&secret);
    }

    Ok(access)
}

/// Materializes an optional `caFile` key off the credentials Secret (the
/// source controller's own convention; there is no dedicated CRD field for
/// it) to a file under the reconciliation's working directory, since
/// `git2`'s TLS configuration expects a path rather than bytes.
fn write_ca_bundle(workdir: &Path, secret: &Secret) -> Result<Option<String>, Error> {
    let Some(data) = secret.data.as_ref() else {
        return Ok(None);
    };
    let Some(bundle) = data.get("caFile") else {
        return Ok(None);
    };
    let path = workdir.join("ca-bundle.pem");
    std::fs::write(&path, &bundle.0).map_err(Error::from)?;
    Ok(Some(path.to_string_lossy().to_string()))
}

/// Reads the signing-key Secret named by `git.commit.signingKey`, if any,
/// following the `git.asc` (+ optional passphrase key) schema (spec §6).
async fn resolve_signing_key(
    ctx: &Arc<Context>,
    ns: &str,
    signing_key: Option<&SigningKeyRef>,
) -> Result<Option<SigningKey>, Error> {
    let Some(signing_key) = signing_key else {
        return Ok(None);
    };

    let secrets: Api<Secret> = Api::namespaced(ctx.client.clone(), ns);
    let secret = secrets
        .get(&signing_key.secret_ref)
        .await
        .map_err(|e| Error::Access(format!("fetching signing-key secret {}: {e}", signing_key.secret_ref)))?;

    let data = secret.data.as_ref().ok_or_else(|| {
        Error::InvalidConfiguration(format!("signing-key secret {} has no data", signing_key.secret_ref))
    })?;
    let armored = data.get("git.asc").ok_or_else(|| {
        Error::InvalidConfiguration(format!("signing-key secret {} has no git.asc key", signing_key.secret_ref))
    })?;
    let passphrase = signing_key
        .passphrase_key
        .as_deref()
        .and_then(|key| data.get(key))
        .map(|v| String::from_utf8_lossy(&v.0).to_string());

    Ok(Some(SigningKey {
        armored_private_key: armored.0.clone(),
        passphrase,
    }))
}

fn observed_policy_map(policies: &PolicyTable) -> BTreeMap<String, ObservedPolicy> {
    policies
        .iter()
        .map(|((ns, name), resolved)| {
            (
                format!("{ns}:{name}"),
                ObservedPolicy {
                    image_name: resolved.latest_image.clone(),
                    tag: resolved.latest_tag.clone(),
                },
            )
        })
        .collect()
}

fn ready_condition(status: &str, reason: &str, message: String, generation: i64) -> Condition {
    Condition {
        type_: "Ready".to_string(),
        status: status.to_string(),
        reason: reason.to_string(),
        message,
        last_transition_time: Time(chrono::Utc::now()),
        observed_generation: Some(generation),
    }
}

fn reconciling_condition(generation: i64) -> Condition {
    Condition {
        type_: "Reconciling".to_string(),
        status: "False".to_string(),
        reason: "Finished".to_string(),
        message: "reconciliation finished".to_string(),
        last_transition_time: Time(chrono::Utc::now()),
        observed_generation: Some(generation),
    }
}

fn stalled_condition(generation: i64, stalled: bool, reason: &str) -> Condition {
    Condition {
        type_: "Stalled".to_string(),
        status: if stalled { "True" } else { "False" }.to_string(),
        reason: reason.to_string(),
        message: if stalled {
            "reconciliation will not be retried until the spec changes".to_string()
        } else {
            "retries permitted".to_string()
        },
        last_transition_time: Time(chrono::Utc::now()),
        observed_generation: Some(generation),
    }
}

fn success_status(
    automation: &ImageUpdateAutomation,
    observed_source_revision: &str,
    observed_policies: &BTreeMap<String, ObservedPolicy>,
    outcome: Option<&PushOutcome>,
) -> ImageUpdateAutomationStatus {
    let mut status = automation.status.clone().unwrap_or_default();
    let generation = automation.meta().generation.unwrap_or(-1);
    status.observed_generation = generation;
    status.observed_source_revision = Some(observed_source_revision.to_string());
    status.observed_policies = observed_policies.clone();
    status.last_automation_run_time = Some(Time(chrono::Utc::now()));
    status.failure_count = 0;

    if let Some(outcome) = outcome {
        status.last_push_commit = Some(outcome.commit.clone());
        status.last_push_time = Some(Time(chrono::Utc::now()));
    }

    let (reason, message) = match outcome {
        Some(o) => ("GitOperationSucceeded", format!("pushed commit {}", o.commit)),
        None => ("ReconciliationSucceeded", "no changes to push".to_string()),
    };

    status.conditions = vec![
        ready_condition("True", reason, message, generation),
        reconciling_condition(generation),
        stalled_condition(generation, false, reason),
    ];

    status
}

fn suspended_status(automation: &ImageUpdateAutomation) -> ImageUpdateAutomationStatus {
    let mut status = automation.status.clone().unwrap_or_default();
    let generation = automation.meta().generation.unwrap_or(-1);
    status.observed_generation = generation;

    status.conditions = vec![
        ready_condition("False", "Suspended", "reconciliation suspended".to_string(), generation),
        reconciling_condition(generation),
        stalled_condition(generation, false, "Suspended"),
    ];

    status
}

fn failure_status(automation: &ImageUpdateAutomation, error: &Error) -> ImageUpdateAutomationStatus {
    let mut status = automation.status.clone().unwrap_or_default();
    let generation = automation.meta().generation.unwrap_or(-1);
    status.observed_generation = generation;
    status.failure_count = status.failure_count.saturating_add(1);

    let stalled = !error.is_retryable();
    status.conditions = vec![
        ready_condition("False", error.reason(), error.to_string(), generation),
        reconciling_condition(generation),
        stalled_condition(generation, stalled, error.reason()),
    ];

    status
}

/// Patches status with the failure condition and publishes a Warning
/// event, best-effort: a failure here is logged but never masks the
/// original reconciliation error.
async fn report_failure(ctx: &Arc<Context>, automation: &Arc<ImageUpdateAutomation>, error: &Error) {
    let Some(ns) = automation.namespace() else {
        return;
    };
    let name = automation.name_any();

    let status = failure_status(automation, error);
    if let Err(patch_error) = patch_status(ctx, &ns, &name, status).await {
        tracing::warn!(automation = %name, %patch_error, "failed to patch status after reconciliation error");
    }

    emit_event(
        ctx,
        automation,
        Event {
            type_: EventType::Warning,
            reason: error.reason().to_string(),
            note: Some(error.to_string()),
            action: "Reconcile".to_string(),
            secondary: None,
        },
    )
    .await;
}

fn recorder_for(ctx: &Arc<Context>, automation: &ImageUpdateAutomation) -> Recorder {
    Recorder::new(ctx.client.clone(), ctx.reporter.clone(), automation.object_ref(&()))
}

async fn emit_event(ctx: &Arc<Context>, automation: &ImageUpdateAutomation, event: Event) {
    if let Err(error) = recorder_for(ctx, automation).publish(event).await {
        tracing::warn!(automation = %automation.name_any(), %error, "failed to publish event");
    }
}

async fn patch_status(
    ctx: &Arc<Context>,
    ns: &str,
    name: &str,
    status: ImageUpdateAutomationStatus,
) -> Result<(), Error> {
    let api: Api<ImageUpdateAutomation> = Api::namespaced(ctx.client.clone(), ns);
    let patch = serde_json::json!({ "status": status });
    api.patch_status(name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .map_err(Error::Kube)?;
    Ok(())
}
