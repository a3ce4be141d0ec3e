//! Process surface (spec §6): CLI flags the controller binary accepts.

use clap::Parser;
use std::collections::BTreeSet;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "image-automation-controller", about = "Reconciles ImageUpdateAutomation objects")]
pub struct ProcessConfig {
    /// Maximum number of automations reconciled concurrently.
    #[arg(long, default_value_t = 4)]
    pub concurrent: usize,

    /// Restrict the watch to objects matching this label selector.
    #[arg(long)]
    pub watch_label_selector: Option<String>,

    /// Watch every namespace instead of the controller's own namespace.
    #[arg(long, default_value_t = false)]
    pub watch_all_namespaces: bool,

    /// Reject `sourceRef`s that point at a different namespace.
    #[arg(long, default_value_t = false)]
    pub no_cross_namespace_refs: bool,

    #[arg(long, value_parser = humantime::parse_duration, default_value = "30s")]
    pub min_retry_delay: Duration,

    #[arg(long, value_parser = humantime::parse_duration, default_value = "15m")]
    pub max_retry_delay: Duration,

    /// Comma-separated SSH key-exchange algorithm preference list.
    #[arg(long, value_delimiter = ',')]
    pub ssh_kex_algos: Vec<String>,

    /// Comma-separated SSH host key algorithm preference list.
    #[arg(long, value_delimiter = ',')]
    pub ssh_hostkey_algos: Vec<String>,

    #[arg(long, default_value = "0.0.0.0:8080")]
    pub metrics_addr: String,

    #[arg(long, default_value = "0.0.0.0:9440")]
    pub health_addr: String,

    /// `key=val,key=val` feature-gate overrides.
    #[arg(long, value_parser = parse_feature_gate, value_delimiter = ',')]
    pub feature_gates: Vec<(String, bool)>,
}

impl ProcessConfig {
    pub fn feature_gates(&self) -> FeatureGates {
        let mut gates = FeatureGates::default();
        for (name, enabled) in &self.feature_gates {
            gates.set(name, *enabled);
        }
        gates
    }
}

fn parse_feature_gate(raw: &str) -> Result<(String, bool), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("feature gate {raw:?} is not in key=val form"))?;
    let enabled = value
        .parse::<bool>()
        .map_err(|_| format!("feature gate {name:?} value must be true/false, got {value:?}"))?;
    Ok((name.to_string(), enabled))
}

/// Known feature gates. Unrecognized names passed via `--feature-gates`
/// are accepted but have no effect, matching the usual Kubernetes
/// feature-gate convention of tolerating gates a given build doesn't know.
#[derive(Debug, Clone)]
pub struct FeatureGates {
    overrides: BTreeSet<String>,
    disabled: BTreeSet<String>,
}

impl Default for FeatureGates {
    fn default() -> Self {
        Self {
            overrides: BTreeSet::new(),
            disabled: BTreeSet::new(),
        }
    }
}

impl FeatureGates {
    pub const GIT_SHALLOW_CLONE: &'static str = "GitShallowClone";
    pub const GIT_ALL_BRANCH_REFERENCES: &'static str = "GitAllBranchReferences";
    pub const GIT_SPARSE_CHECKOUT: &'static str = "GitSparseCheckout";
    pub const GIT_FORCE_PUSH_BRANCH: &'static str = "GitForcePushBranch";
    pub const CACHE_SECRETS_AND_CONFIG_MAPS: &'static str = "CacheSecretsAndConfigMaps";

    /// Gates enabled unless explicitly disabled.
    const DEFAULT_ON: &'static [&'static str] = &[Self::GIT_SHALLOW_CLONE];

    fn set(&mut self, name: &str, enabled: bool) {
        self.overrides.insert(name.to_string());
        if enabled {
            self.disabled.remove(name);
        } else {
            self.disabled.insert(name.to_string());
        }
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        if self.disabled.contains(name) {
            return false;
        }
        self.overrides.contains(name) || Self::DEFAULT_ON.contains(&name)
    }
}
