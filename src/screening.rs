//! Screening reader: finds the files worth parsing at all.
//!
//! Walks a directory subtree, skips anything that isn't a YAML file, and
//! for the ones that are, does a cheap raw-byte substring test for the
//! marker token before bothering to parse. Only files that pass both
//! filters are handed to the setter engine.

use crate::marker::SHORTHAND;
use std::fs;
use std::path::{Path, PathBuf};

const YAML_EXTENSIONS: &[&str] = &["yaml", "yml"];

#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A file that passed screening: it is a YAML file under the subtree whose
/// raw bytes contain the marker token. `bytes` are the untouched original
/// contents, handed to the setter engine for its span-preserving rewrite.
#[derive(Debug, Clone)]
pub struct ScreenedFile {
    /// Path relative to `root`.
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Walks `root` and returns every screened file in lexicographic path
/// order (the ordering the commit templater later depends on).
pub fn screen(root: &Path) -> Result<Vec<ScreenedFile>, ScreenError> {
    let mut out = Vec::new();

    let walker = walkdir::WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name();

    let canonical_root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let path = entry.path();

        if entry.file_type().is_symlink() {
            match resolves_inside(path, &canonical_root) {
                Some(target) if target.is_file() => {
                    screen_one(&target, path, root, &mut out)?;
                }
                _ => continue,
            }
            continue;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        if !has_yaml_extension(path) {
            continue;
        }

        screen_one(path, path, root, &mut out)?;
    }

    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}

fn screen_one(
    read_from: &Path,
    logical_path: &Path,
    root: &Path,
    out: &mut Vec<ScreenedFile>,
) -> Result<(), ScreenError> {
    let bytes = fs::read(read_from).map_err(|source| ScreenError::Read {
        path: logical_path.to_path_buf(),
        source,
    })?;

    if !contains_marker_token(&bytes) {
        return Ok(());
    }

    validate_yaml(&bytes, logical_path)?;

    let relative = logical_path.strip_prefix(root).unwrap_or(logical_path);
    out.push(ScreenedFile {
        path: relative.to_path_buf(),
        bytes,
    });
    Ok(())
}

fn has_yaml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| YAML_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn contains_marker_token(bytes: &[u8]) -> bool {
    let needle = SHORTHAND.as_bytes();
    bytes
        .windows(needle.len())
        .any(|window| window == needle)
}

/// Multi-document parse, purely to surface `ParseError` on malformed YAML
/// before the setter engine ever touches the file. The setter engine does
/// its own tree-sitter-level parse separately, since this `serde_yaml`
/// pass cannot preserve formatting.
fn validate_yaml(bytes: &[u8], path: &Path) -> Result<(), ScreenError> {
    let text = String::from_utf8_lossy(bytes);
    for document in serde_yaml::Deserializer::from_str(&text) {
        serde_yaml::Value::deserialize(document).map_err(|source| ScreenError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Resolves a symlink and returns its target only if the target is inside
/// `canonical_root`. Broken or out-of-tree symlinks are skipped silently
/// by returning `None`.
fn resolves_inside(link: &Path, canonical_root: &Path) -> Option<PathBuf> {
    let target = fs::canonicalize(link).ok()?;
    if target.starts_with(canonical_root) {
        Some(target)
    } else {
        None
    }
}

use serde::Deserialize as _;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn skips_files_without_marker_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("a.yaml")).unwrap();
        writeln!(f, "image: helloworld:v1.0.0").unwrap();

        let screened = screen(dir.path()).unwrap();
        assert!(screened.is_empty());
    }

    #[test]
    fn picks_up_files_with_marker_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("a.yaml")).unwrap();
        writeln!(
            f,
            "image: helloworld:v1.0.0 # {{\"imagepolicy\": \"ns1:p1\"}}"
        )
        .unwrap();

        let screened = screen(dir.path()).unwrap();
        assert_eq!(screened.len(), 1);
        assert_eq!(screened[0].path, Path::new("a.yaml"));
    }

    #[test]
    fn ignores_non_yaml_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("a.txt")).unwrap();
        writeln!(f, "# {{\"imagepolicy\": \"ns1:p1\"}}").unwrap();

        let screened = screen(dir.path()).unwrap();
        assert!(screened.is_empty());
    }

    #[test]
    fn surfaces_parse_errors_for_screened_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("bad.yaml")).unwrap();
        writeln!(f, "image: [ this is not valid # {{\"imagepolicy\": \"ns1:p1\"}}").unwrap();

        let err = screen(dir.path()).unwrap_err();
        assert!(matches!(err, ScreenError::Parse { .. }));
    }
}
