//! Marker parsing edge cases not already covered by `src/marker.rs`'s own
//! unit tests: comments with surrounding prose and malformed JSON payloads.

use image_update_automation::marker::{self, MarkerError};

#[test]
fn tolerates_leading_and_trailing_whitespace() {
    let marker = marker::parse(r#"  #   {"imagepolicy": "flux-system:podinfo"}  "#).unwrap();
    assert_eq!(marker.namespace.as_deref(), Some("flux-system"));
    assert_eq!(marker.name, "podinfo");
}

#[test]
fn rejects_malformed_json() {
    let err = marker::parse(r#"# {"imagepolicy": }"#).unwrap_err();
    assert!(matches!(err, MarkerError::MalformedJson(_)));
}

#[test]
fn rejects_value_missing_a_name() {
    let err = marker::parse(r#"{"imagepolicy": "flux-system"}"#).unwrap_err();
    assert!(matches!(err, MarkerError::MalformedValue(_)));
}

#[test]
fn comment_mentioning_the_token_in_prose_without_json_is_rejected_as_malformed() {
    // Contains the shorthand token but isn't valid marker JSON at all; this
    // must surface as an error, not be silently treated as "no marker here".
    let err = marker::parse("# see imagepolicy docs for details").unwrap_err();
    assert!(matches!(err, MarkerError::MalformedJson(_)));
}
