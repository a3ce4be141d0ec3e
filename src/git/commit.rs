//! Commit construction: signature, staged tree, templated message, and
//! optional detached GPG signing (spec §4.4).

use crate::git::error::{classify, GitError};
use git2::{Repository, Signature};

pub struct CommitAuthor<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

/// An ASCII-armored OpenPGP private key plus optional passphrase, already
/// read out of the signing-key Secret.
pub struct SigningKey {
    pub armored_private_key: Vec<u8>,
    pub passphrase: Option<String>,
}

/// Stages every modification under the repository root and produces one
/// commit with `message`, signed by `signing_key` when present.
///
/// Returns `GitError::EmptyCommit` if the worktree has no changes relative
/// to `HEAD` — the engine never produces a commit for a no-op run.
pub fn commit_all(
    repo: &Repository,
    author: CommitAuthor<'_>,
    message: &str,
    signing_key: Option<&SigningKey>,
) -> Result<git2::Oid, GitError> {
    let mut index = repo.index().map_err(classify)?;
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .map_err(classify)?;
    index.write().map_err(classify)?;

    let tree_id = index.write_tree().map_err(classify)?;
    let tree = repo.find_tree(tree_id).map_err(classify)?;

    let head = repo.head().map_err(classify)?;
    let parent = head.peel_to_commit().map_err(classify)?;

    if parent.tree_id() == tree_id {
        return Err(GitError::EmptyCommit);
    }

    let signature = Signature::now(author.name, author.email).map_err(classify)?;

    match signing_key {
        None => repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])
            .map_err(classify),
        Some(key) => commit_signed(repo, &signature, message, &tree, &parent, key),
    }
}

fn commit_signed(
    repo: &Repository,
    signature: &Signature<'_>,
    message: &str,
    tree: &git2::Tree<'_>,
    parent: &git2::Commit<'_>,
    key: &SigningKey,
) -> Result<git2::Oid, GitError> {
    let buffer = repo
        .commit_create_buffer(signature, signature, message, tree, &[parent])
        .map_err(classify)?;
    let buffer_str = buffer
        .as_str()
        .ok_or_else(|| GitError::Signing("commit buffer is not valid UTF-8".to_string()))?;

    let armored_signature = sign_detached(&key.armored_private_key, key.passphrase.as_deref(), buffer_str.as_bytes())?;

    let commit_oid = repo
        .commit_signed(buffer_str, &armored_signature, Some("gpgsig"))
        .map_err(classify)?;

    repo.head()
        .and_then(|h| h.name().map(str::to_string).ok_or_else(|| git2::Error::from_str("detached HEAD")))
        .and_then(|refname| repo.reference(&refname, commit_oid, true, "image-automation: commit"))
        .map_err(classify)?;

    Ok(commit_oid)
}

fn sign_detached(armored_key: &[u8], passphrase: Option<&str>, content: &[u8]) -> Result<String, GitError> {
    let mut ctx = gpgme::Context::from_protocol(gpgme::Protocol::OpenPgp)
        .map_err(|e| GitError::Signing(e.to_string()))?;
    ctx.set_armor(true);

    let mut key_data = gpgme::Data::from_bytes(armored_key).map_err(|e| GitError::Signing(e.to_string()))?;
    let import_result = ctx.import(&mut key_data).map_err(|e| GitError::Signing(e.to_string()))?;
    let fingerprint = import_result
        .imports()
        .next()
        .and_then(|i| i.fingerprint().ok())
        .ok_or_else(|| GitError::Signing("no key imported from the signing secret".to_string()))?
        .to_string();

    let key = ctx
        .get_secret_key(&fingerprint)
        .map_err(|e| GitError::Signing(e.to_string()))?;
    ctx.add_signer(&key).map_err(|e| GitError::Signing(e.to_string()))?;

    if let Some(passphrase) = passphrase {
        let passphrase = passphrase.to_string();
        ctx.set_passphrase_provider(move |_: gpgme::PassphraseRequest<'_>, out: &mut dyn std::io::Write| {
            out.write_all(passphrase.as_bytes())?;
            Ok(())
        });
    }

    let mut signature = Vec::new();
    ctx.sign(gpgme::SignMode::Detached, content, &mut signature)
        .map_err(|e| GitError::Signing(e.to_string()))?;

    String::from_utf8(signature).map_err(|e| GitError::Signing(e.to_string()))
}
