//! Commit templater (spec §4.6).
//!
//! Renders the author-supplied message template against a fixed value set
//! (`AutomationObject`, `Updated.{Files,Objects,Images}`, `Values`) plus a
//! small library of sprig-style string helpers.

use crate::setters::SetterResult;
use minijinja::{Environment, Error as MinijinjaError};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
#[error("rendering commit message template: {0}")]
pub struct TemplateError(#[from] MinijinjaError);

#[derive(Serialize)]
struct Updated {
    #[serde(rename = "Files")]
    files: Vec<String>,
    #[serde(rename = "Objects")]
    objects: BTreeMap<String, Vec<ChangeView>>,
    #[serde(rename = "Images")]
    images: Vec<String>,
}

#[derive(Serialize)]
struct ChangeView {
    setter: String,
    old: String,
    new: String,
}

#[derive(Serialize)]
struct TemplateContext {
    #[serde(rename = "AutomationObject")]
    automation_object: String,
    #[serde(rename = "Updated")]
    updated: Updated,
    #[serde(rename = "Values")]
    values: BTreeMap<String, String>,
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    // A handful of sprig-compatible aliases on top of minijinja's own
    // lower/upper/trim/join/replace/title/truncate builtins.
    env.add_filter("quote", |value: String| format!("{value:?}"));
    env.add_filter("trimSuffix", |value: String, suffix: String| {
        value.strip_suffix(suffix.as_str()).unwrap_or(&value).to_string()
    });
    env.add_filter("trimPrefix", |value: String, prefix: String| {
        value.strip_prefix(prefix.as_str()).unwrap_or(&value).to_string()
    });
    env.add_filter("nindent", |value: String, n: usize| {
        let pad = " ".repeat(n);
        value
            .lines()
            .map(|line| format!("{pad}{line}"))
            .collect::<Vec<_>>()
            .join("\n")
    });
    env
}

/// Renders `template` against the automation's identity, the setter
/// engine's result, and the user-supplied `values` map.
pub fn render(
    template: &str,
    automation_namespace: &str,
    automation_name: &str,
    result: &SetterResult,
    values: &BTreeMap<String, String>,
) -> Result<String, TemplateError> {
    let env = environment();

    let objects = result
        .objects()
        .into_iter()
        .map(|(id, changes)| {
            let views = changes
                .into_iter()
                .map(|c| ChangeView {
                    setter: c.setter_name,
                    old: c.old_value,
                    new: c.new_value,
                })
                .collect();
            (id.to_string(), views)
        })
        .collect();

    let files = result
        .changed_files()
        .into_iter()
        .map(|p| p.display().to_string())
        .collect();

    let context = TemplateContext {
        automation_object: format!("{automation_namespace}/{automation_name}"),
        updated: Updated {
            files,
            objects,
            images: result.images(),
        },
        values: values.clone(),
    };

    let rendered = env.render_str(template, context)?;
    Ok(rendered)
}

pub const DEFAULT_TEMPLATE: &str = "Update images\n\nAutomation: {{ AutomationObject }}\n{% for image in Updated.Images %}\n- {{ image }}\n{% endfor %}\n";
