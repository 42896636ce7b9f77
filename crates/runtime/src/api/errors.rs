//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and scenario loading so clients can
//! bubble them up with consistent context.
use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("script worker command channel closed")]
    CommandChannelClosed,

    #[error("script worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("script worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error("script failed at task `{task}`")]
    ScriptFailed { task: String },

    #[error("script still running after {ticks} ticks")]
    TickBudgetExhausted { ticks: u64 },
}

/// Failures while reading or validating a scenario file.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario RON")]
    Parse(#[source] ron::error::SpannedError),

    #[error("invalid scenario: {0}")]
    Invalid(String),
}
