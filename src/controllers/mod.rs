pub mod automation_controller;

pub use automation_controller::{error_policy, reconcile};
