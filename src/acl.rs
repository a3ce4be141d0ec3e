//! Cross-namespace access control (spec §4.7).

use crate::errors::Error;

/// Rejects a cross-namespace `sourceRef` unless cross-namespace references
/// are explicitly allowed for the controller instance.
pub fn check_cross_namespace(
    automation_namespace: &str,
    source_namespace: &str,
    no_cross_namespace_refs: bool,
) -> Result<(), Error> {
    if no_cross_namespace_refs && automation_namespace != source_namespace {
        return Err(Error::Access(format!(
            "cross-namespace sourceRef from {automation_namespace} to {source_namespace} is disabled"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_namespace_always_allowed() {
        assert!(check_cross_namespace("ns", "ns", true).is_ok());
    }

    #[test]
    fn cross_namespace_rejected_when_disabled() {
        assert!(check_cross_namespace("ns1", "ns2", true).is_err());
    }

    #[test]
    fn cross_namespace_allowed_when_enabled() {
        assert!(check_cross_namespace("ns1", "ns2", false).is_ok());
    }
}
