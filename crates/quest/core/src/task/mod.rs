//! The task abstraction and its building blocks.
//!
//! A task is one automatable objective. The runner calls
//! [`Task::execute`] once per scheduling pass while [`Task::is_pending`]
//! holds; the task mutates only itself and reports its outcome through
//! [`TaskStatus`].
mod attempts;
mod distance;
mod phase;
mod talk;

pub use attempts::AttemptCounter;
pub use distance::{DistanceCache, PathDistance};
pub use phase::TaskPhase;
pub use talk::{TalkToNpcTask, TalkToNpcTaskBuilder};

use crate::env::TaskEnv;
use crate::error::TaskError;
use crate::state::WorldPoint;

/// Lifecycle of a task. `Completed` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl TaskStatus {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

/// Snapshot of a task's attempt counters and position in its step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskProgress {
    pub phase: TaskPhase,
    pub walk_attempts: u32,
    pub talk_attempts: u32,
}

/// One retryable objective driven by a [`crate::runner::TaskRunner`].
pub trait Task: Send {
    /// Human-readable label, stable for the task's lifetime.
    fn name(&self) -> &str;

    /// Where the objective takes place.
    fn location(&self) -> WorldPoint;

    /// Runs one execution step.
    ///
    /// Returns `false` when the runner must not invoke the task again.
    fn execute(&mut self, env: &TaskEnv<'_>) -> bool;

    fn status(&self) -> TaskStatus;

    /// Continuation predicate: the task should be (re)invoked.
    fn is_pending(&self) -> bool {
        self.status() == TaskStatus::Pending
    }

    fn is_completed(&self) -> bool {
        self.status() == TaskStatus::Completed
    }

    fn is_failed(&self) -> bool {
        self.status() == TaskStatus::Failed
    }

    /// Estimated travel cost from the player to [`Task::location`].
    fn distance(&mut self, env: &TaskEnv<'_>) -> PathDistance;

    fn progress(&self) -> TaskProgress {
        TaskProgress::default()
    }

    fn phase(&self) -> TaskPhase {
        self.progress().phase
    }

    /// Why the task failed, once it has.
    fn failure(&self) -> Option<&TaskError> {
        None
    }
}
