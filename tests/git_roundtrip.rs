//! Clone/commit/push exercised against a local bare repository, standing
//! in for a Git remote so the push-branch state machine runs through a
//! real `git2` transport rather than mocks.

use git2::Repository;
use image_update_automation::crds::automation::PushSpec;
use image_update_automation::git::auth::AccessConfig;
use image_update_automation::git::error::GitError;
use image_update_automation::git::push::PushDecision;
use image_update_automation::git::{clone, commit, push};
use std::path::Path;

fn init_bare_origin_with_one_commit(bare_dir: &Path, scratch: &Path) -> git2::Oid {
    Repository::init_bare(bare_dir).unwrap();

    let seed = scratch.join("seed");
    let repo = Repository::init(&seed).unwrap();
    std::fs::write(seed.join("deploy.yaml"), "image: helloworld:v1.0.0\n").unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new("deploy.yaml")).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = git2::Signature::now("seed", "seed@example.com").unwrap();
    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, "seed commit", &tree, &[])
        .unwrap();

    repo.remote("origin", bare_dir.to_str().unwrap()).unwrap();
    let mut remote = repo.find_remote("origin").unwrap();
    remote
        .push(&["refs/heads/master:refs/heads/master"], None)
        .unwrap();

    oid
}

#[test]
fn clone_commit_and_push_round_trips_through_a_bare_remote() {
    let scratch = tempfile::tempdir().unwrap();
    let bare_dir = scratch.path().join("origin.git");
    init_bare_origin_with_one_commit(&bare_dir, scratch.path());

    let work_dir = scratch.path().join("work");
    let access = AccessConfig::default();
    let repo = clone::clone(bare_dir.to_str().unwrap(), None, &work_dir, &access, false).unwrap();

    std::fs::write(work_dir.join("deploy.yaml"), "image: helloworld:v1.0.1\n").unwrap();

    let oid = commit::commit_all(
        &repo,
        commit::CommitAuthor {
            name: "automation",
            email: "automation@example.com",
        },
        "bump image",
        None,
    )
    .unwrap();
    assert_ne!(oid, git2::Oid::zero());

    let checkout_ref_name = repo.head().unwrap().shorthand().unwrap().to_string();
    let decision = push::decide(&repo, &checkout_ref_name, None, &access).unwrap();
    assert!(matches!(decision, PushDecision::ToCheckout));

    let pushed = push::execute(&repo, &decision, None, &Default::default(), &access).unwrap();
    assert_eq!(pushed, oid);

    let bare = Repository::open_bare(&bare_dir).unwrap();
    let bare_head = bare
        .find_reference(&format!("refs/heads/{checkout_ref_name}"))
        .unwrap()
        .peel_to_commit()
        .unwrap()
        .id();
    assert_eq!(bare_head, oid);
}

#[test]
fn empty_commit_is_refused() {
    let scratch = tempfile::tempdir().unwrap();
    let bare_dir = scratch.path().join("origin.git");
    init_bare_origin_with_one_commit(&bare_dir, scratch.path());

    let work_dir = scratch.path().join("work");
    let access = AccessConfig::default();
    let repo = clone::clone(bare_dir.to_str().unwrap(), None, &work_dir, &access, false).unwrap();

    let err = commit::commit_all(
        &repo,
        commit::CommitAuthor {
            name: "automation",
            email: "automation@example.com",
        },
        "no-op commit",
        None,
    )
    .unwrap_err();

    assert!(matches!(err, GitError::EmptyCommit));
}

#[test]
fn signing_with_an_invalid_key_surfaces_a_signing_error() {
    let scratch = tempfile::tempdir().unwrap();
    let bare_dir = scratch.path().join("origin.git");
    init_bare_origin_with_one_commit(&bare_dir, scratch.path());

    let work_dir = scratch.path().join("work");
    let access = AccessConfig::default();
    let repo = clone::clone(bare_dir.to_str().unwrap(), None, &work_dir, &access, false).unwrap();

    std::fs::write(work_dir.join("deploy.yaml"), "image: helloworld:v1.0.1\n").unwrap();

    let signing_key = commit::SigningKey {
        armored_private_key: b"not a real pgp key".to_vec(),
        passphrase: None,
    };

    let err = commit::commit_all(
        &repo,
        commit::CommitAuthor {
            name: "automation",
            email: "automation@example.com",
        },
        "bump image",
        Some(&signing_key),
    )
    .unwrap_err();

    assert!(matches!(err, GitError::Signing(_)));
}

#[test]
fn diverged_push_branch_is_synced_and_replayed_before_fast_forwarding() {
    let scratch = tempfile::tempdir().unwrap();
    let bare_dir = scratch.path().join("origin.git");
    init_bare_origin_with_one_commit(&bare_dir, scratch.path());

    let access = AccessConfig::default();
    let push_spec = PushSpec {
        branch: Some("release".to_string()),
        refspec: None,
        force: false,
        options: Default::default(),
    };

    // Both clones start from the same origin state, before either advances.
    let work_a = scratch.path().join("work-a");
    let repo_a = clone::clone(bare_dir.to_str().unwrap(), None, &work_a, &access, false).unwrap();
    let work_b = scratch.path().join("work-b");
    let repo_b = clone::clone(bare_dir.to_str().unwrap(), None, &work_b, &access, false).unwrap();

    // A advances and creates the "release" push branch on the remote.
    std::fs::write(work_a.join("deploy.yaml"), "image: helloworld:v1.1.0\n").unwrap();
    let release_commit = commit::commit_all(
        &repo_a,
        commit::CommitAuthor {
            name: "automation",
            email: "automation@example.com",
        },
        "release bump",
        None,
    )
    .unwrap();
    let checkout_ref_name_a = repo_a.head().unwrap().shorthand().unwrap().to_string();
    let decision = push::decide(&repo_a, &checkout_ref_name_a, Some(&push_spec), &access).unwrap();
    assert!(matches!(decision, PushDecision::CreateFrom { .. }));
    let pushed = push::execute(&repo_a, &decision, None, &Default::default(), &access).unwrap();
    assert_eq!(pushed, release_commit);

    // B never saw A's release commit, so pushing its own commit to "release"
    // diverges from what's now on the remote.
    std::fs::write(work_b.join("deploy.yaml"), "image: helloworld:v1.2.0\n").unwrap();
    commit::commit_all(
        &repo_b,
        commit::CommitAuthor {
            name: "automation",
            email: "automation@example.com",
        },
        "diverging bump",
        None,
    )
    .unwrap();
    let checkout_ref_name_b = repo_b.head().unwrap().shorthand().unwrap().to_string();

    let decision = push::decide(&repo_b, &checkout_ref_name_b, Some(&push_spec), &access).unwrap();
    let remote_head = match decision {
        PushDecision::SyncAndReplay { remote_head, .. } => remote_head,
        other => panic!("expected SyncAndReplay, got {other:?}"),
    };
    assert_eq!(remote_head, release_commit);

    push::reset_local_to(&repo_b, "release", remote_head).unwrap();
    std::fs::write(work_b.join("deploy.yaml"), "image: helloworld:v1.2.0\n").unwrap();
    let replayed_commit = commit::commit_all(
        &repo_b,
        commit::CommitAuthor {
            name: "automation",
            email: "automation@example.com",
        },
        "diverging bump replayed",
        None,
    )
    .unwrap();

    let decision = push::decide(&repo_b, &checkout_ref_name_b, Some(&push_spec), &access).unwrap();
    assert!(matches!(decision, PushDecision::FastForward { .. }));
    let pushed = push::execute(&repo_b, &decision, None, &Default::default(), &access).unwrap();
    assert_eq!(pushed, replayed_commit);
}

#[test]
fn push_diverging_from_the_remote_checkout_ref_is_rejected() {
    let scratch = tempfile::tempdir().unwrap();
    let bare_dir = scratch.path().join("origin.git");
    init_bare_origin_with_one_commit(&bare_dir, scratch.path());

    let access = AccessConfig::default();

    // Both clones start from the same origin state, before either advances.
    let work_a = scratch.path().join("work-a");
    let repo_a = clone::clone(bare_dir.to_str().unwrap(), None, &work_a, &access, false).unwrap();
    let work_b = scratch.path().join("work-b");
    let repo_b = clone::clone(bare_dir.to_str().unwrap(), None, &work_b, &access, false).unwrap();

    // A advances the checkout ref and pushes straight to it.
    std::fs::write(work_a.join("deploy.yaml"), "image: helloworld:v1.1.0\n").unwrap();
    commit::commit_all(
        &repo_a,
        commit::CommitAuthor {
            name: "automation",
            email: "automation@example.com",
        },
        "advance checkout ref",
        None,
    )
    .unwrap();
    let checkout_ref_name_a = repo_a.head().unwrap().shorthand().unwrap().to_string();
    let decision = push::decide(&repo_a, &checkout_ref_name_a, None, &access).unwrap();
    push::execute(&repo_a, &decision, None, &Default::default(), &access).unwrap();

    // B never saw A's advance; its own divergent commit can't be pushed
    // without first syncing.
    std::fs::write(work_b.join("deploy.yaml"), "image: helloworld:v1.2.0\n").unwrap();
    commit::commit_all(
        &repo_b,
        commit::CommitAuthor {
            name: "automation",
            email: "automation@example.com",
        },
        "diverging commit",
        None,
    )
    .unwrap();
    let checkout_ref_name_b = repo_b.head().unwrap().shorthand().unwrap().to_string();
    let decision = push::decide(&repo_b, &checkout_ref_name_b, None, &access).unwrap();

    let err = push::execute(&repo_b, &decision, None, &Default::default(), &access).unwrap_err();
    assert!(matches!(err, GitError::Rejected(_)));
}
