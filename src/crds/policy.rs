//! `ImagePolicy`: read-only collaborator. The upstream image scanner
//! populates `status.latestImage`/`status.latestRef`; this controller only
//! ever reads those two fields.

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ImagePolicy {
    #[serde(default)]
    pub status: ImagePolicyStatus,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ImagePolicyStatus {
    /// Full resolved image reference, e.g. `index.docker.io/org/app:v1.2.3`.
    #[serde(rename = "latestImage", skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<String>,

    /// The name/tag decomposition of `latest_image`.
    #[serde(rename = "latestRef", skip_serializing_if = "Option::is_none")]
    pub latest_ref: Option<LatestRef>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct LatestRef {
    pub name: String,
    pub tag: String,
}

impl ImagePolicy {
    /// `None` for policies with an empty `latestImage`: the engine treats
    /// these as silently ignored, not as an error.
    pub fn latest_image(&self) -> Option<&str> {
        self.status
            .latest_image
            .as_deref()
            .filter(|s| !s.is_empty())
    }
}
