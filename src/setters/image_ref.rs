//! Image reference parsing and canonicalization.
//!
//! Canonicalization (default registry, default tag) exists solely so the
//! setter engine can compare the *current* scalar against the *projected*
//! replacement without being fooled by an implicit `index.docker.io` or
//! `:latest` the user never wrote out. The scalar itself is never
//! rewritten to its canonical form — only the projection result is
//! written, and only when it differs from the scalar as written.

pub const DEFAULT_REGISTRY: &str = "index.docker.io";
pub const DEFAULT_TAG: &str = "latest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Registry + repository, e.g. `index.docker.io/org/app`.
    pub name: String,
    pub tag: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ImageRefError {
    #[error("empty image reference")]
    Empty,
    #[error("image reference {0:?} has an empty tag")]
    EmptyTag(String),
}

/// Parses `value` into name/tag, applying the default registry and tag
/// where absent, for comparison purposes only.
pub fn parse_canonical(value: &str) -> Result<ImageRef, ImageRefError> {
    if value.is_empty() {
        return Err(ImageRefError::Empty);
    }

    // A digest reference (`name@sha256:...`) has no separate "tag" slot;
    // treat the digest as the tag component for comparison purposes.
    let (name_and_tag, digest) = match value.split_once('@') {
        Some((left, right)) => (left, Some(right)),
        None => (value, None),
    };

    let (name, tag) = split_name_tag(name_and_tag);

    let tag = if let Some(digest) = digest {
        format!("{tag}@{digest}")
    } else {
        tag
    };

    if tag.is_empty() {
        return Err(ImageRefError::EmptyTag(value.to_string()));
    }

    Ok(ImageRef {
        name: canonicalize_name(&name),
        tag,
    })
}

/// Splits `registry/repo:tag` on the last `:` that comes after the last
/// `/`, so registry ports (`myregistry:5000/app`) are not mistaken for a
/// tag separator.
fn split_name_tag(value: &str) -> (String, String) {
    let last_slash = value.rfind('/');
    let search_from = last_slash.map(|i| i + 1).unwrap_or(0);

    match value[search_from..].rfind(':') {
        Some(colon_rel) => {
            let colon = search_from + colon_rel;
            (value[..colon].to_string(), value[colon + 1..].to_string())
        }
        None => (value.to_string(), DEFAULT_TAG.to_string()),
    }
}

fn canonicalize_name(name: &str) -> String {
    let has_registry = name.contains('/') && {
        let first_segment = name.split('/').next().unwrap_or("");
        first_segment.contains('.') || first_segment.contains(':') || first_segment == "localhost"
    };

    if has_registry {
        name.to_string()
    } else {
        format!("{DEFAULT_REGISTRY}/{name}")
    }
}
