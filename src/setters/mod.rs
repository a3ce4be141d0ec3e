pub mod engine;
pub mod image_ref;
pub mod result;

pub use engine::{apply, EngineError, PolicyTable, ResolvedPolicy};
pub use result::{Change, ObjectId, SetterResult};
