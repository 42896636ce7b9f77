//! Event types for different topics.

use quest_core::{TaskPhase, TaskReport, Tick};
use serde::{Deserialize, Serialize};

/// Per-task lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskEvent {
    /// The runner activated a task.
    TaskStarted { index: usize, name: String },

    /// The active task ran one pass and is still pending.
    TaskProgressed {
        index: usize,
        name: String,
        phase: TaskPhase,
        walk_attempts: u32,
        talk_attempts: u32,
    },

    TaskCompleted { report: TaskReport },

    /// `reason` is the task's recorded failure, if any.
    TaskFailed {
        report: TaskReport,
        reason: Option<String>,
    },
}

/// Script-level outcome events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptEvent {
    /// Every queued task completed.
    ScriptFinished { completed: usize },

    /// A task failed and the script is halted.
    ScriptFailed { task: String },

    ScriptAborted,
}

/// Narrator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementEvent {
    /// Published when a narrator's rendered text changes.
    RequirementUpdated {
        /// Narrator index in registration order.
        narrator: usize,
        tick: Tick,
        text: String,
        /// Quantity of the first listed requirement.
        quantity: Option<u32>,
    },
}
