//! Runtime orchestration for scripted task execution.
//!
//! This crate wires the synchronous `quest-core` runner to a host: a single
//! script worker owns the runner and the narrators, a cloneable handle delivers
//! ticks and commands, and a topic event bus reports progress. Consumers embed
//! [`Runtime`] and drive it through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`workers`] keeps the script worker internal to the crate
//! - [`oracle`] provides the simulated world used by tests and the CLI
//! - [`scenario`] loads simulated worlds and scripts from RON files
pub mod api;
pub mod events;
pub mod oracle;
pub mod runtime;
pub mod scenario;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle, ScenarioError};
pub use events::{Event, EventBus, RequirementEvent, ScriptEvent, TaskEvent, Topic};
pub use oracle::{SimInteraction, SimLog, SimNpc, SimWorld};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use scenario::{NpcSpec, RequirementSpec, Scenario, TaskSpec};
