//! Retryable, condition-gated task execution for scripted in-game objectives.
//!
//! `quest-core` models each objective (talk to a character, finish a quest
//! sub-goal) as a [`task::Task`]: a small state machine with bounded attempt
//! counters, a tick-keyed distance cache and explicit terminal states. The
//! [`runner::TaskRunner`] re-invokes pending tasks once per host tick until they
//! succeed or fail, and [`requirement`] keeps per-tick derived requirements in
//! sync with live world counters.
//!
//! The crate never talks to a game client directly. Everything it needs from
//! the outside world is expressed as an oracle trait in [`env`] and bundled in
//! [`env::TaskEnv`], so hosts, simulators and test doubles are interchangeable.
pub mod config;
pub mod env;
pub mod error;
pub mod jitter;
pub mod requirement;
pub mod runner;
pub mod state;
pub mod task;
pub mod wait;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{TaskConfig, TimingConfig};
pub use env::{
    ClockOracle, DialogueOracle, HostOracles, InteractionOracle, NpcOracle, PathOracle,
    PathResult, PathStatus, PcgRng, ReachOracle, RngOracle, TaskEnv, TravelerProfile,
    WorldOracle, compute_seed,
};
pub use error::{AttemptKind, ErrorSeverity, TaskError};
pub use jitter::{Jitter, TimingRange};
pub use requirement::{
    DynamicRequirement, ItemRequirement, NarratedStep, Narrator, QUANTITY_PLACEHOLDER,
};
pub use runner::{Pass, ScriptStatus, SelectionPolicy, TaskReport, TaskRunner};
pub use state::{CounterId, NameFilter, Npc, NpcId, Point3D, Tick, WorldPoint};
pub use task::{
    AttemptCounter, DistanceCache, PathDistance, TalkToNpcTask, TalkToNpcTaskBuilder, Task,
    TaskPhase, TaskProgress, TaskStatus,
};
pub use wait::WaitGate;
