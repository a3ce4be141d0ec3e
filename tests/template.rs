//! Commit message template rendering against a multi-image `SetterResult`,
//! exercising sprig-style filters and the default template end to end.

use image_update_automation::setters::{Change, ObjectId, SetterResult};
use image_update_automation::template;
use std::collections::BTreeMap;
use std::path::PathBuf;

fn two_image_result() -> SetterResult {
    let mut result = SetterResult::new();
    result.record_change(
        PathBuf::from("deploy/podinfo.yaml"),
        ObjectId {
            api_version: "apps/v1".to_string(),
            kind: "Deployment".to_string(),
            namespace: Some("flux-system".to_string()),
            name: "podinfo".to_string(),
        },
        Change {
            old_value: "ghcr.io/stefanprodan/podinfo:6.3.0".to_string(),
            new_value: "ghcr.io/stefanprodan/podinfo:6.4.0".to_string(),
            setter_name: "flux-system:podinfo".to_string(),
        },
    );
    result.record_change(
        PathBuf::from("deploy/redis.yaml"),
        ObjectId {
            api_version: "apps/v1".to_string(),
            kind: "Deployment".to_string(),
            namespace: Some("flux-system".to_string()),
            name: "redis".to_string(),
        },
        Change {
            old_value: "redis:7.0.0".to_string(),
            new_value: "redis:7.0.1".to_string(),
            setter_name: "flux-system:redis".to_string(),
        },
    );
    result
}

#[test]
fn default_template_lists_every_updated_image() {
    let result = two_image_result();
    let values = BTreeMap::new();
    let rendered = template::render(
        template::DEFAULT_TEMPLATE,
        "flux-system",
        "apps",
        &result,
        &values,
    )
    .unwrap();

    assert!(rendered.contains("flux-system/apps"));
    assert!(rendered.contains("ghcr.io/stefanprodan/podinfo:6.4.0"));
    assert!(rendered.contains("redis:7.0.1"));
}

#[test]
fn custom_template_can_use_sprig_style_filters_and_values() {
    let result = two_image_result();
    let mut values = BTreeMap::new();
    values.insert("environment".to_string(), "staging".to_string());

    let custom = "{{ Values.environment | upper }}: {{ Updated.Images | join(\", \") | trimSuffix(\".0\") }}";
    let rendered = template::render(custom, "flux-system", "apps", &result, &values).unwrap();

    assert!(rendered.starts_with("STAGING: "));
    assert!(rendered.contains("ghcr.io/stefanprodan/podinfo:6.4.0"));
}

#[test]
fn rejects_a_malformed_template() {
    let result = SetterResult::new();
    let values = BTreeMap::new();
    let err = template::render("{{ Updated.Images[ }}", "ns", "name", &result, &values).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("rendering commit message template"));
}
