//! Marker schema: the inline YAML comment that binds a scalar field to a
//! named policy and projection.
//!
//! Syntax: `# { "imagepolicy": "<ns>:<name>[:<projection>]" }`, attached as
//! the trailing comment of the scalar to rewrite. `<projection>` is one of
//! `full` (the default, when omitted), `tag`, or `name`.

use serde::Deserialize;

/// The shorthand token this controller recognizes. A stable, documented
/// string rather than anything configurable.
pub const SHORTHAND: &str = "imagepolicy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// `policy.latest_image` verbatim.
    Full,
    /// `policy.latest_ref.tag` only.
    Tag,
    /// The image name portion (registry + repository, no tag/digest).
    Name,
}

impl Projection {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(Projection::Full),
            "tag" => Some(Projection::Tag),
            "name" => Some(Projection::Name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub namespace: Option<String>,
    pub name: String,
    pub projection: Projection,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MarkerError {
    #[error("comment does not contain the marker token")]
    NoMarker,
    #[error("malformed marker JSON: {0}")]
    MalformedJson(String),
    #[error("marker value must be '<ns>:<name>' or '<ns>:<name>:<projection>', got {0:?}")]
    MalformedValue(String),
    #[error("unknown projection {0:?}")]
    UnknownProjection(String),
}

#[derive(Deserialize)]
struct RawMarker {
    #[serde(rename = "imagepolicy")]
    imagepolicy: String,
}

/// Parses a trailing YAML comment (with or without the leading `#`) for a
/// marker. Returns `Err(NoMarker)` when the comment simply isn't one of
/// ours — the caller should treat that as "no marker here", not an error.
pub fn parse(comment: &str) -> Result<Marker, MarkerError> {
    let text = comment.trim_start_matches('#').trim();
    if !text.contains(SHORTHAND) {
        return Err(MarkerError::NoMarker);
    }

    let raw: RawMarker =
        serde_json::from_str(text).map_err(|e| MarkerError::MalformedJson(e.to_string()))?;

    parse_value(&raw.imagepolicy)
}

fn parse_value(value: &str) -> Result<Marker, MarkerError> {
    let mut parts = value.splitn(3, ':');
    let ns = parts.next().filter(|s| !s.is_empty());
    let name = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| MarkerError::MalformedValue(value.to_string()))?;
    let projection = match parts.next() {
        None => Projection::Full,
        Some(p) => Projection::parse(p).ok_or_else(|| MarkerError::UnknownProjection(p.to_string()))?,
    };

    Ok(Marker {
        namespace: ns.map(str::to_string),
        name: name.to_string(),
        projection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_projection_by_default() {
        let m = parse(r#"# {"imagepolicy": "ns1:p1"}"#).unwrap();
        assert_eq!(m.namespace.as_deref(), Some("ns1"));
        assert_eq!(m.name, "p1");
        assert_eq!(m.projection, Projection::Full);
    }

    #[test]
    fn parses_explicit_projection() {
        let m = parse(r#"{"imagepolicy": "ns1:p1:tag"}"#).unwrap();
        assert_eq!(m.projection, Projection::Tag);

        let m = parse(r#"{"imagepolicy": "ns1:p1:name"}"#).unwrap();
        assert_eq!(m.projection, Projection::Name);
    }

    #[test]
    fn namespace_may_be_omitted() {
        let m = parse(r#"{"imagepolicy": ":p1"}"#).unwrap();
        assert_eq!(m.namespace, None);
        assert_eq!(m.name, "p1");
    }

    #[test]
    fn rejects_unrelated_comments() {
        assert_eq!(parse("# just a comment"), Err(MarkerError::NoMarker));
    }

    #[test]
    fn rejects_unknown_projection() {
        let err = parse(r#"{"imagepolicy": "ns1:p1:digest"}"#).unwrap_err();
        assert_eq!(err, MarkerError::UnknownProjection("digest".to_string()));
    }
}
