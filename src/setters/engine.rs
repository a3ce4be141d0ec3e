//! The setter engine: walks every screened document, rewrites the scalars
//! carrying a recognized marker, and leaves everything else — including
//! untouched files — byte-for-byte identical.
//!
//! Rewriting goes through `tree-sitter-yaml` rather than `serde_yaml`
//! because the hard requirement (spec §8, invariant 2) is that an
//! untouched file round-trips as the exact same bytes, and a
//! `serde_yaml`-based round-trip normalizes formatting and drops
//! comments. Instead, each document is parsed into a concrete syntax
//! tree purely to find byte ranges to splice; the splice is applied to
//! the original byte buffer, so a file with zero splices is returned
//! verbatim by construction.

use crate::marker::{self, Marker, MarkerError, Projection};
use crate::screening::ScreenedFile;
use crate::setters::image_ref::{self, ImageRefError};
use crate::setters::result::{Change, ObjectId, SetterResult};
use serde::Deserialize;
use std::collections::HashMap;
use tree_sitter::{Node, Parser};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{path}: failed to initialize the YAML parser")]
    ParserInit { path: String },

    #[error("{path}: tree-sitter could not parse this document")]
    SyntaxTree { path: String },

    #[error("{path}: marker on {value:?} is malformed: {source}")]
    MalformedMarker {
        path: String,
        value: String,
        #[source]
        source: MarkerError,
    },

    #[error("{path}: scalar {value:?} is not a well-formed image reference: {source}")]
    MalformedImageRef {
        path: String,
        value: String,
        #[source]
        source: ImageRefError,
    },
}

/// A resolved policy, as the engine needs it: just enough to compute every
/// projection.
#[derive(Debug, Clone)]
pub struct ResolvedPolicy {
    pub latest_image: String,
    pub latest_tag: String,
}

/// Key: `(namespace, name)`.
pub type PolicyTable = HashMap<(String, String), ResolvedPolicy>;

/// Runs the setter engine over every screened file. Returns the structured
/// result plus the new contents of every file that changed, so the caller
/// can write them back to disk in one pass; files with no entry here are
/// guaranteed byte-identical to their input.
pub fn apply(
    files: &[ScreenedFile],
    policies: &PolicyTable,
    default_namespace: &str,
) -> Result<(SetterResult, Vec<(std::path::PathBuf, Vec<u8>)>), EngineError> {
    let mut result = SetterResult::new();
    let mut writes = Vec::new();

    for file in files {
        let path_str = file.path.display().to_string();
        match rewrite_file(file, policies, default_namespace, &mut result, &path_str)? {
            Some(bytes) => writes.push((file.path.clone(), bytes)),
            None => result.mark_unchanged(file.path.clone()),
        }
    }

    Ok((result, writes))
}

fn rewrite_file(
    file: &ScreenedFile,
    policies: &PolicyTable,
    default_namespace: &str,
    result: &mut SetterResult,
    path_str: &str,
) -> Result<Option<Vec<u8>>, EngineError> {
    let mut splices: Vec<Splice> = Vec::new();

    for doc in split_documents(&file.bytes) {
        let object = document_identity(doc.bytes, default_namespace);
        let doc_splices = rewrite_document(doc.bytes, policies, default_namespace, path_str)?;

        for mut splice in doc_splices {
            splice.start += doc.start;
            splice.end += doc.start;
            splice.object = object.clone();
            splices.push(splice);
        }
    }

    if splices.is_empty() {
        return Ok(None);
    }

    splices.sort_by(|a, b| b.start.cmp(&a.start));

    let mut out = file.bytes.clone();
    for splice in &splices {
        out.splice(splice.start..splice.end, splice.replacement.iter().copied());
    }

    // Record changes in document order (ascending start offset), not the
    // descending order used to apply the splice safely.
    let mut ordered = splices;
    ordered.sort_by(|a, b| a.start.cmp(&b.start));
    for splice in ordered {
        result.record_change(
            file.path.clone(),
            splice.object,
            Change {
                old_value: splice.old_value,
                new_value: splice.new_value,
                setter_name: splice.setter_name,
            },
        );
    }

    Ok(Some(out))
}

struct Document<'a> {
    start: usize,
    bytes: &'a [u8],
}

/// Splits a multi-document YAML file on `---` separator lines. Kept
/// deliberately simple (line-oriented) rather than relying on tree-sitter's
/// top-level node shape, which is re-parsed per document anyway below.
fn split_documents(bytes: &[u8]) -> Vec<Document<'_>> {
    let mut docs = Vec::new();
    let mut doc_start = 0usize;
    let mut offset = 0usize;

    for line in bytes.split_inclusive(|&b| b == b'\n') {
        let trimmed = trim_ascii(line);
        if trimmed == b"---" {
            if offset > doc_start {
                docs.push(Document {
                    start: doc_start,
                    bytes: &bytes[doc_start..offset],
                });
            }
            doc_start = offset + line.len();
        }
        offset += line.len();
    }

    if doc_start < bytes.len() {
        docs.push(Document {
            start: doc_start,
            bytes: &bytes[doc_start..],
        });
    }

    if docs.is_empty() {
        docs.push(Document { start: 0, bytes });
    }

    docs
}

fn trim_ascii(line: &[u8]) -> &[u8] {
    let mut s = line;
    while let Some((&last, rest)) = s.split_last() {
        if last == b'\n' || last == b'\r' || last == b' ' || last == b'\t' {
            s = rest;
        } else {
            break;
        }
    }
    while let Some((&first, rest)) = s.split_first() {
        if first == b' ' || first == b'\t' {
            s = rest;
        } else {
            break;
        }
    }
    s
}

#[derive(Deserialize, Default)]
struct ObjectIdentityDoc {
    #[serde(rename = "apiVersion", default)]
    api_version: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    metadata: ObjectMetaMini,
}

#[derive(Deserialize, Default)]
struct ObjectMetaMini {
    #[serde(default)]
    name: String,
    #[serde(default)]
    namespace: Option<String>,
}

fn document_identity(doc_bytes: &[u8], default_namespace: &str) -> ObjectId {
    let text = String::from_utf8_lossy(doc_bytes);
    let parsed: ObjectIdentityDoc = serde_yaml::from_str(&text).unwrap_or_default();
    ObjectId {
        api_version: parsed.api_version,
        kind: parsed.kind,
        namespace: Some(
            parsed
                .metadata
                .namespace
                .unwrap_or_else(|| default_namespace.to_string()),
        ),
        name: parsed.metadata.name,
    }
}

struct Splice {
    start: usize,
    end: usize,
    replacement: Vec<u8>,
    old_value: String,
    new_value: String,
    setter_name: String,
    object: ObjectId,
}

const SCALAR_KINDS: &[&str] = &[
    "plain_scalar",
    "single_quote_scalar",
    "double_quote_scalar",
    "string_scalar",
];

fn rewrite_document(
    doc_bytes: &[u8],
    policies: &PolicyTable,
    default_namespace: &str,
    path_str: &str,
) -> Result<Vec<Splice>, EngineError> {
    let mut parser = Parser::new();
    parser
        .set_language(tree_sitter_yaml::language())
        .map_err(|_| EngineError::ParserInit {
            path: path_str.to_string(),
        })?;

    let tree = parser
        .parse(doc_bytes, None)
        .ok_or_else(|| EngineError::SyntaxTree {
            path: path_str.to_string(),
        })?;

    let mut scalars = Vec::new();
    let mut comments = Vec::new();
    collect_leaves(tree.root_node(), &mut scalars, &mut comments);

    let mut splices = Vec::new();

    for comment in &comments {
        let comment_text = comment
            .utf8_text(doc_bytes)
            .unwrap_or_default();

        let marker = match marker::parse(comment_text) {
            Ok(m) => m,
            Err(MarkerError::NoMarker) => continue,
            Err(e) => {
                return Err(EngineError::MalformedMarker {
                    path: path_str.to_string(),
                    value: comment_text.to_string(),
                    source: e,
                })
            }
        };

        let Some(scalar) = preceding_scalar_on_same_line(doc_bytes, *comment, &scalars) else {
            continue;
        };

        if let Some(splice) = build_splice(doc_bytes, scalar, &marker, policies, default_namespace, path_str)? {
            splices.push(splice);
        }
    }

    Ok(splices)
}

/// Recursively collects every named leaf node, bucketed into scalar
/// candidates and comments.
fn collect_leaves<'a>(node: Node<'a>, scalars: &mut Vec<Node<'a>>, comments: &mut Vec<Node<'a>>) {
    if node.child_count() == 0 {
        if node.is_named() {
            if node.kind() == "comment" {
                comments.push(node);
            } else if SCALAR_KINDS.contains(&node.kind()) {
                scalars.push(node);
            }
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_leaves(child, scalars, comments);
    }
}

/// Finds the last scalar node that ends on the same source line as
/// `comment`, before the comment starts. This is "the node the marker is
/// attached to" — the rewriter never looks past the end of the line.
fn preceding_scalar_on_same_line<'a>(
    source: &[u8],
    comment: Node<'a>,
    scalars: &[Node<'a>],
) -> Option<Node<'a>> {
    let line_start = source[..comment.start_byte()]
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);

    scalars
        .iter()
        .filter(|s| s.start_byte() >= line_start && s.end_byte() <= comment.start_byte())
        .max_by_key(|s| s.end_byte())
        .copied()
}

fn build_splice(
    source: &[u8],
    scalar: Node<'_>,
    marker: &Marker,
    policies: &PolicyTable,
    default_namespace: &str,
    path_str: &str,
) -> Result<Option<Splice>, EngineError> {
    let namespace = marker
        .namespace
        .clone()
        .unwrap_or_else(|| default_namespace.to_string());

    let Some(policy) = policies.get(&(namespace.clone(), marker.name.clone())) else {
        // Unresolved policy: skip the node, not an error.
        return Ok(None);
    };

    let (quote, inner_start, inner_end) = unwrap_quoting(scalar);
    let current_value = String::from_utf8_lossy(&source[inner_start..inner_end]).to_string();

    image_ref::parse_canonical(&current_value).map_err(|source_err| {
        EngineError::MalformedImageRef {
            path: path_str.to_string(),
            value: current_value.clone(),
            source: source_err,
        }
    })?;

    let projected = match marker.projection {
        Projection::Full => policy.latest_image.clone(),
        Projection::Tag => policy.latest_tag.clone(),
        Projection::Name => name_only(&policy.latest_image),
    };

    if projected == current_value {
        return Ok(None);
    }

    let replacement = match quote {
        Some(q) => format!("{q}{projected}{q}"),
        None => projected.clone(),
    };

    Ok(Some(Splice {
        start: scalar.start_byte(),
        end: scalar.end_byte(),
        replacement: replacement.into_bytes(),
        old_value: current_value,
        new_value: projected,
        setter_name: format!("{namespace}:{}", marker.name),
        object: ObjectId {
            api_version: String::new(),
            kind: String::new(),
            namespace: None,
            name: String::new(),
        },
    }))
}

/// Returns `(quote_char, inner_start, inner_end)`: for quoted scalars the
/// inner range excludes the surrounding quote bytes so the replacement can
/// re-wrap in the same quote style; for plain scalars the whole node is
/// the value.
fn unwrap_quoting(node: Node<'_>) -> (Option<char>, usize, usize) {
    match node.kind() {
        "single_quote_scalar" => (Some('\''), node.start_byte() + 1, node.end_byte() - 1),
        "double_quote_scalar" => (Some('"'), node.start_byte() + 1, node.end_byte() - 1),
        _ => (None, node.start_byte(), node.end_byte()),
    }
}

/// The image *name* portion (registry + repository, no tag/digest).
fn name_only(full_ref: &str) -> String {
    image_ref::parse_canonical(full_ref)
        .map(|r| r.name)
        .unwrap_or_else(|_| full_ref.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn policies(entries: &[(&str, &str, &str, &str)]) -> PolicyTable {
        entries
            .iter()
            .map(|(ns, name, image, tag)| {
                (
                    (ns.to_string(), name.to_string()),
                    ResolvedPolicy {
                        latest_image: image.to_string(),
                        latest_tag: tag.to_string(),
                    },
                )
            })
            .collect()
    }

    fn screened(path: &str, content: &str) -> ScreenedFile {
        ScreenedFile {
            path: PathBuf::from(path),
            bytes: content.as_bytes().to_vec(),
        }
    }

    // S1: tag bump.
    #[test]
    fn bumps_tag_when_policy_advances() {
        let files = vec![screened(
            "deploy.yaml",
            "image: helloworld:v1.0.0 # {\"imagepolicy\": \"ns1:p1\"}\n",
        )];
        let policies = policies(&[("ns1", "p1", "helloworld:v1.0.1", "v1.0.1")]);

        let (result, writes) = apply(&files, &policies, "ns1").unwrap();
        assert_eq!(result.changed_file_count(), 1);
        assert_eq!(writes.len(), 1);
        let (_, bytes) = &writes[0];
        assert_eq!(
            String::from_utf8_lossy(bytes),
            "image: helloworld:v1.0.1 # {\"imagepolicy\": \"ns1:p1\"}\n"
        );
    }

    // S2: no change leaves the file untouched.
    #[test]
    fn leaves_file_untouched_when_already_current() {
        let files = vec![screened(
            "deploy.yaml",
            "image: helloworld:v1.0.0 # {\"imagepolicy\": \"ns1:p1\"}\n",
        )];
        let policies = policies(&[("ns1", "p1", "helloworld:v1.0.0", "v1.0.0")]);

        let (result, writes) = apply(&files, &policies, "ns1").unwrap();
        assert!(!result.has_changes());
        assert!(writes.is_empty());
    }

    #[test]
    fn projection_correctness_for_each_kind() {
        let policies = policies(&[("ns1", "p1", "ghcr.io/org/app:v2.0.0", "v2.0.0")]);

        let full = vec![screened(
            "a.yaml",
            "image: old:old # {\"imagepolicy\": \"ns1:p1\"}\n",
        )];
        let (_, writes) = apply(&full, &policies, "ns1").unwrap();
        assert!(String::from_utf8_lossy(&writes[0].1).contains("ghcr.io/org/app:v2.0.0"));

        let tag = vec![screened(
            "b.yaml",
            "tag: old # {\"imagepolicy\": \"ns1:p1:tag\"}\n",
        )];
        let (_, writes) = apply(&tag, &policies, "ns1").unwrap();
        assert!(String::from_utf8_lossy(&writes[0].1).contains("tag: v2.0.0"));

        let name = vec![screened(
            "c.yaml",
            "repository: old # {\"imagepolicy\": \"ns1:p1:name\"}\n",
        )];
        let (_, writes) = apply(&name, &policies, "ns1").unwrap();
        assert!(String::from_utf8_lossy(&writes[0].1).contains("repository: ghcr.io/org/app"));
    }

    // Marker locality: a sibling field without a marker is never rewritten.
    #[test]
    fn only_marked_scalars_are_rewritten() {
        let files = vec![screened(
            "deploy.yaml",
            "replicas: 3\nimage: helloworld:v1.0.0 # {\"imagepolicy\": \"ns1:p1\"}\n",
        )];
        let policies = policies(&[("ns1", "p1", "helloworld:v1.0.1", "v1.0.1")]);

        let (_, writes) = apply(&files, &policies, "ns1").unwrap();
        let text = String::from_utf8_lossy(&writes[0].1);
        assert!(text.starts_with("replicas: 3\n"));
    }

    // Idempotence: running the engine again on its own output is a no-op.
    #[test]
    fn is_idempotent() {
        let policies = policies(&[("ns1", "p1", "helloworld:v1.0.1", "v1.0.1")]);
        let first = vec![screened(
            "deploy.yaml",
            "image: helloworld:v1.0.0 # {\"imagepolicy\": \"ns1:p1\"}\n",
        )];
        let (_, writes) = apply(&first, &policies, "ns1").unwrap();
        let rewritten = screened("deploy.yaml", &String::from_utf8_lossy(&writes[0].1));

        let (result, writes) = apply(&[rewritten], &policies, "ns1").unwrap();
        assert!(!result.has_changes());
        assert!(writes.is_empty());
    }

    // An unresolved policy leaves the node untouched rather than erroring.
    #[test]
    fn unresolved_policy_is_skipped_not_an_error() {
        let files = vec![screened(
            "deploy.yaml",
            "image: helloworld:v1.0.0 # {\"imagepolicy\": \"ns1:missing\"}\n",
        )];
        let policies = policies(&[]);

        let (result, writes) = apply(&files, &policies, "ns1").unwrap();
        assert!(!result.has_changes());
        assert!(writes.is_empty());
    }

    #[test]
    fn preserves_single_quote_style() {
        let files = vec![screened(
            "deploy.yaml",
            "image: 'helloworld:v1.0.0' # {\"imagepolicy\": \"ns1:p1\"}\n",
        )];
        let policies = policies(&[("ns1", "p1", "helloworld:v1.0.1", "v1.0.1")]);

        let (_, writes) = apply(&files, &policies, "ns1").unwrap();
        assert!(String::from_utf8_lossy(&writes[0].1).contains("'helloworld:v1.0.1'"));
    }
}
