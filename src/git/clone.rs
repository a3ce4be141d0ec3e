//! Clone and checkout (spec §4.4).
//!
//! Every reconciliation gets a fresh, shallow-capable clone into a
//! dedicated temporary directory; no working copy is ever reused across
//! runs.

use crate::git::auth::AccessConfig;
use crate::git::error::{classify, GitError};
use git2::build::RepoBuilder;
use git2::Repository;
use std::path::Path;

use crate::crds::automation::CheckoutRef;

/// Clones `url` into `dest`, checking out `checkout_ref` (or the remote's
/// default branch when unset).
pub fn clone(
    url: &str,
    checkout_ref: Option<&CheckoutRef>,
    dest: &Path,
    access: &AccessConfig,
    shallow: bool,
) -> Result<Repository, GitError> {
    let branch_hint = checkout_ref.and_then(|r| r.branch.as_deref());

    let mut builder = RepoBuilder::new();
    let mut fetch_options = access.fetch_options();
    if shallow {
        fetch_options.depth(1);
    }
    builder.fetch_options(fetch_options);
    if let Some(branch) = branch_hint {
        builder.branch(branch);
    }

    let repo = builder.clone(url, dest).map_err(classify)?;

    if let Some(checkout_ref) = checkout_ref {
        checkout(&repo, checkout_ref, access)?;
    }

    Ok(repo)
}

/// Checks out the ref named by `checkout_ref`: exactly one of branch, tag,
/// commit, or semver range should be set.
pub fn checkout(repo: &Repository, checkout_ref: &CheckoutRef, access: &AccessConfig) -> Result<(), GitError> {
    if let Some(branch) = &checkout_ref.branch {
        return checkout_branch(repo, branch);
    }
    if let Some(tag) = &checkout_ref.tag {
        return checkout_refname(repo, &format!("refs/tags/{tag}"));
    }
    if let Some(commit) = &checkout_ref.commit {
        return checkout_commit(repo, commit);
    }
    if let Some(range) = &checkout_ref.semver {
        let tag = resolve_semver_tag(repo, range, access)?;
        return checkout_refname(repo, &format!("refs/tags/{tag}"));
    }
    Ok(())
}

fn checkout_branch(repo: &Repository, branch: &str) -> Result<(), GitError> {
    let refname = format!("refs/remotes/origin/{branch}");
    let (object, reference) = repo.revparse_ext(&refname).map_err(classify)?;
    repo.checkout_tree(&object, None).map_err(classify)?;
    match reference {
        Some(reference) => repo.set_head(reference.name().unwrap_or(&refname)),
        None => repo.set_head_detached(object.id()),
    }
    .map_err(classify)
}

fn checkout_refname(repo: &Repository, refname: &str) -> Result<(), GitError> {
    let object = repo
        .revparse_single(refname)
        .map_err(|_| GitError::RefNotFound(refname.to_string()))?;
    repo.checkout_tree(&object, None).map_err(classify)?;
    repo.set_head_detached(object.id()).map_err(classify)
}

fn checkout_commit(repo: &Repository, commit: &str) -> Result<(), GitError> {
    let oid = git2::Oid::from_str(commit).map_err(|_| GitError::RefNotFound(commit.to_string()))?;
    let object = repo
        .find_object(oid, None)
        .map_err(|_| GitError::RefNotFound(commit.to_string()))?;
    repo.checkout_tree(&object, None).map_err(classify)?;
    repo.set_head_detached(oid).map_err(classify)
}

fn resolve_semver_tag(repo: &Repository, range: &str, _access: &AccessConfig) -> Result<String, GitError> {
    let req = semver::VersionReq::parse(range)
        .map_err(|e| GitError::RefNotFound(format!("invalid semver range {range:?}: {e}")))?;

    let tag_names = repo.tag_names(None).map_err(classify)?;
    let mut best: Option<(semver::Version, String)> = None;

    for name in tag_names.iter().flatten() {
        let stripped = name.strip_prefix('v').unwrap_or(name);
        let Ok(version) = semver::Version::parse(stripped) else {
            continue;
        };
        if !req.matches(&version) {
            continue;
        }
        if best.as_ref().map(|(v, _)| version > *v).unwrap_or(true) {
            best = Some((version, name.to_string()));
        }
    }

    best.map(|(_, name)| name)
        .ok_or_else(|| GitError::RefNotFound(format!("no tag satisfies semver range {range:?}")))
}

/// Returns the OID of `HEAD`.
pub fn head_oid(repo: &Repository) -> Result<git2::Oid, GitError> {
    Ok(repo.head().map_err(classify)?.peel_to_commit().map_err(classify)?.id())
}
