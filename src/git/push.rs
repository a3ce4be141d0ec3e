//! The push-branch state machine (spec §4.4).
//!
//! `decide` inspects local and remote state and returns which of the five
//! table rows applies; `execute` carries out every row except
//! `SyncAndReplay`, which needs the setter engine to re-run on top of the
//! synced branch before anything can be pushed — that orchestration lives
//! in the reconciler, which calls `reset_local_to` and then re-enters this
//! module once a new commit exists.

use crate::crds::automation::PushSpec;
use crate::git::error::{classify, GitError};
use git2::{Oid, Repository};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub enum PushDecision {
    /// P absent or P == C: push straight to the checkout ref.
    ToCheckout,
    /// P exists only locally (or nowhere at all yet): create it from C's
    /// head and push, setting upstream.
    CreateFrom { branch: String, base: Oid },
    /// P exists remotely and is an ancestor of the local head.
    FastForward { branch: String },
    /// P exists remotely, diverged, and `force` is set.
    Force { branch: String },
    /// P exists remotely, diverged, `force` is unset: the caller must
    /// reset to `remote_head`, re-run the setter engine, commit, and push
    /// again (which will then be a `FastForward`).
    SyncAndReplay { branch: String, remote_head: Oid },
}

/// Decides which state-machine row applies, given the current local head
/// on the checkout ref and the push spec.
pub fn decide(
    repo: &Repository,
    checkout_ref_name: &str,
    push: Option<&PushSpec>,
    access: &crate::git::auth::AccessConfig,
) -> Result<PushDecision, GitError> {
    let Some(push) = push else {
        return Ok(PushDecision::ToCheckout);
    };
    let Some(branch) = &push.branch else {
        return Ok(PushDecision::ToCheckout);
    };
    if branch == checkout_ref_name {
        return Ok(PushDecision::ToCheckout);
    }

    let local_head = crate::git::clone::head_oid(repo)?;

    match fetch_remote_branch_oid(repo, "origin", branch, access)? {
        None => Ok(PushDecision::CreateFrom {
            branch: branch.clone(),
            base: local_head,
        }),
        Some(remote_head) if remote_head == local_head => Ok(PushDecision::FastForward {
            branch: branch.clone(),
        }),
        Some(remote_head) => {
            let is_ancestor = repo
                .graph_descendant_of(local_head, remote_head)
                .map_err(classify)?;
            if is_ancestor {
                Ok(PushDecision::FastForward {
                    branch: branch.clone(),
                })
            } else if push.force {
                Ok(PushDecision::Force {
                    branch: branch.clone(),
                })
            } else {
                Ok(PushDecision::SyncAndReplay {
                    branch: branch.clone(),
                    remote_head,
                })
            }
        }
    }
}

/// Carries out every decision except `SyncAndReplay`. Returns the head
/// hash the remote actually accepted.
pub fn execute(
    repo: &Repository,
    decision: &PushDecision,
    refspec: Option<&str>,
    options: &BTreeMap<String, String>,
    access: &crate::git::auth::AccessConfig,
) -> Result<Oid, GitError> {
    let (branch, force, base) = match decision {
        PushDecision::ToCheckout => {
            let head = crate::git::clone::head_oid(repo)?;
            let head_ref = repo.head().map_err(classify)?;
            let branch_name = head_ref
                .shorthand()
                .ok_or_else(|| GitError::RefNotFound("detached HEAD has no branch name".to_string()))?
                .to_string();
            push_refname(repo, &format!("refs/heads/{branch_name}"), false, options, access)?;
            if let Some(refspec) = refspec {
                push_verbatim_refspec(repo, refspec, access)?;
            }
            return Ok(head);
        }
        PushDecision::CreateFrom { branch, base } => (branch, false, Some(*base)),
        PushDecision::FastForward { branch } => (branch, false, None),
        PushDecision::Force { branch } => (branch, true, None),
        PushDecision::SyncAndReplay { .. } => {
            return Err(GitError::Rejected(
                "SyncAndReplay must be re-planned after resetting and re-applying setters".to_string(),
            ))
        }
    };

    if let Some(base) = base {
        let commit = repo.find_commit(base).map_err(classify)?;
        repo.branch(branch, &commit, true).map_err(classify)?;
    } else {
        // Point the local branch ref at the current HEAD commit so the
        // refspec below pushes the right thing.
        let head = crate::git::clone::head_oid(repo)?;
        let commit = repo.find_commit(head).map_err(classify)?;
        repo.branch(branch, &commit, true).map_err(classify)?;
    }

    push_refname(repo, &format!("refs/heads/{branch}"), force, options, access)?;
    if let Some(refspec) = refspec {
        push_verbatim_refspec(repo, refspec, access)?;
    }

    let oid = repo
        .find_reference(&format!("refs/heads/{branch}"))
        .map_err(classify)?
        .peel_to_commit()
        .map_err(classify)?
        .id();
    Ok(oid)
}

/// Resets the local `branch` ref (and, if it is the current HEAD, the
/// working tree) to `remote_head`. Used by the reconciler to implement the
/// "fetch P, reset, re-run setters" branch of the state machine.
pub fn reset_local_to(repo: &Repository, branch: &str, remote_head: Oid) -> Result<(), GitError> {
    let commit = repo.find_commit(remote_head).map_err(classify)?;
    repo.branch(branch, &commit, true).map_err(classify)?;
    repo.set_head(&format!("refs/heads/{branch}")).map_err(classify)?;
    let object = repo.find_object(remote_head, None).map_err(classify)?;
    repo.checkout_tree(&object, Some(git2::build::CheckoutBuilder::new().force()))
        .map_err(classify)
}

fn push_refname(
    repo: &Repository,
    refname: &str,
    force: bool,
    options: &BTreeMap<String, String>,
    access: &crate::git::auth::AccessConfig,
) -> Result<(), GitError> {
    let mut remote = repo.find_remote("origin").map_err(classify)?;
    let spec = if force {
        format!("+{refname}:{refname}")
    } else {
        format!("{refname}:{refname}")
    };
    let mut push_options = access.push_options();
    if !options.is_empty() {
        let opts: Vec<String> = options.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let opt_refs: Vec<&str> = opts.iter().map(String::as_str).collect();
        push_options.push_options(opt_refs);
    }
    remote
        .push(&[spec.as_str()], Some(&mut push_options))
        .map_err(classify_push_error)
}

fn push_verbatim_refspec(
    repo: &Repository,
    refspec: &str,
    access: &crate::git::auth::AccessConfig,
) -> Result<(), GitError> {
    let mut remote = repo.find_remote("origin").map_err(classify)?;
    let mut push_options = access.push_options();
    remote
        .push(&[refspec], Some(&mut push_options))
        .map_err(classify_push_error)
}

/// `git2` reports a rejected push the same way as any other transport
/// failure; distinguish it via the message, matching the taxonomy's
/// `Rejected` variant used by the reconciler's self-healing retry.
fn classify_push_error(err: git2::Error) -> GitError {
    let message = err.message().to_lowercase();
    if message.contains("rejected") || message.contains("non-fast-forward") || message.contains("fetch first") {
        GitError::Rejected(err.message().to_string())
    } else {
        classify(err)
    }
}

fn fetch_remote_branch_oid(
    repo: &Repository,
    remote_name: &str,
    branch: &str,
    access: &crate::git::auth::AccessConfig,
) -> Result<Option<Oid>, GitError> {
    let mut remote = repo.find_remote(remote_name).map_err(classify)?;
    let refspec = format!("+refs/heads/{branch}:refs/remotes/{remote_name}/{branch}");
    let mut fetch_options = access.fetch_options();
    match remote.fetch(&[refspec.as_str()], Some(&mut fetch_options), None) {
        Ok(()) => {}
        Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(classify(e)),
    }

    match repo.find_reference(&format!("refs/remotes/{remote_name}/{branch}")) {
        Ok(reference) => Ok(Some(reference.peel_to_commit().map_err(classify)?.id())),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
        Err(e) => Err(classify(e)),
    }
}
