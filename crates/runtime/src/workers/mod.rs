//! Worker tasks that back the runtime orchestration.

mod script;

pub use script::{Command, ScriptWorker};
