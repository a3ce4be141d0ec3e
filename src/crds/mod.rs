//! Custom Resource Definitions.
//!
//! One module per Kind, following `phgit_operator`'s layout: the struct
//! decorated with `#[derive(CustomResource)]` is the desired state
//! (`spec`), with a companion `Status` struct the controller owns
//! exclusively. `GitRepository` and `ImagePolicy` are read-only
//! collaborators this controller never writes, so they skip the
//! `CustomResource` derive and are just plain typed views onto objects
//! owned by other controllers.

pub mod automation;
pub mod policy;
pub mod source;

pub use automation::{ImageUpdateAutomation, ImageUpdateAutomationSpec, ImageUpdateAutomationStatus};
pub use policy::ImagePolicy;
pub use source::GitRepository;
