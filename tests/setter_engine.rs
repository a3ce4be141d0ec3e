//! Screening + setter engine exercised against a real directory tree,
//! including a multi-document file and a nested sub-path.

use image_update_automation::screening;
use image_update_automation::setters::{self, PolicyTable, ResolvedPolicy};
use std::fs;
use std::io::Write;

fn policy_table() -> PolicyTable {
    let mut table = PolicyTable::new();
    table.insert(
        ("flux-system".to_string(), "podinfo".to_string()),
        ResolvedPolicy {
            latest_image: "ghcr.io/stefanprodan/podinfo:6.4.0".to_string(),
            latest_tag: "6.4.0".to_string(),
        },
    );
    table
}

#[test]
fn rewrites_only_the_marked_document_in_a_multi_document_file() {
    let dir = tempfile::tempdir().unwrap();
    let manifests = dir.path().join("manifests");
    fs::create_dir(&manifests).unwrap();

    let mut f = fs::File::create(manifests.join("app.yaml")).unwrap();
    writeln!(
        f,
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: unrelated\ndata:\n  level: debug\n---\napiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: podinfo\n  namespace: flux-system\nspec:\n  template:\n    spec:\n      containers:\n        - image: ghcr.io/stefanprodan/podinfo:6.3.0 # {{\"imagepolicy\": \"flux-system:podinfo\"}}\n"
    )
    .unwrap();

    let screened = screening::screen(&manifests).unwrap();
    assert_eq!(screened.len(), 1);

    let (result, writes) = setters::apply(&screened, &policy_table(), "flux-system").unwrap();
    assert_eq!(writes.len(), 1);
    assert_eq!(result.changed_file_count(), 1);

    let (_, bytes) = &writes[0];
    let text = String::from_utf8_lossy(bytes);
    assert!(text.contains("level: debug"));
    assert!(text.contains("ghcr.io/stefanprodan/podinfo:6.4.0"));
    assert!(!text.contains("6.3.0"));
}

#[test]
fn screening_recurses_into_subdirectories_in_lexicographic_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();

    fs::write(
        dir.path().join("b/z.yaml"),
        "image: old # {\"imagepolicy\": \"flux-system:podinfo\"}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("a/y.yaml"),
        "image: old # {\"imagepolicy\": \"flux-system:podinfo\"}\n",
    )
    .unwrap();

    let screened = screening::screen(dir.path()).unwrap();
    let paths: Vec<_> = screened.iter().map(|f| f.path.display().to_string()).collect();
    assert_eq!(paths, vec!["a/y.yaml".to_string(), "b/z.yaml".to_string()]);
}
