//! Shared reconciler context threaded through every `Controller::run` call.

use crate::config::ProcessConfig;
use kube::runtime::events::Reporter;
use kube::Client;

pub struct Context {
    pub client: Client,
    pub config: ProcessConfig,
    /// Identifies this controller as the source of every `Recorder`-published
    /// Kubernetes event.
    pub reporter: Reporter,
}
