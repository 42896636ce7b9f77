//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! ticking the script or streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use quest_core::{ScriptStatus, Task, TaskReport};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Deliver one host tick: refresh narrators, then run one scheduling pass.
    pub async fn tick(&self) -> Result<ScriptStatus> {
        self.request(|reply| Command::Tick { reply }).await
    }

    /// Append a task to the script; returns its index in push order.
    pub async fn enqueue(&self, task: impl Task + 'static) -> Result<usize> {
        self.enqueue_boxed(Box::new(task)).await
    }

    pub async fn enqueue_boxed(&self, task: Box<dyn Task>) -> Result<usize> {
        self.request(|reply| Command::Enqueue { task, reply }).await
    }

    /// Stop the script at the next pass boundary.
    pub async fn abort(&self) -> Result<ScriptStatus> {
        self.request(|reply| Command::Abort { reply }).await
    }

    pub async fn status(&self) -> Result<ScriptStatus> {
        self.request(|reply| Command::QueryStatus { reply }).await
    }

    /// Reports of every settled task, in settlement order.
    pub async fn reports(&self) -> Result<Vec<TaskReport>> {
        self.request(|reply| Command::QueryReports { reply }).await
    }

    /// Tick until the script settles or `max_ticks` elapse.
    ///
    /// `between` runs after every tick that left the script running; hosts
    /// use it to advance their own world clock. An empty script returns `Idle`;
    /// a failed script surfaces as [`RuntimeError::ScriptFailed`].
    pub async fn run_until_settled(
        &self,
        max_ticks: u64,
        mut between: impl FnMut(),
    ) -> Result<ScriptStatus> {
        for _ in 0..max_ticks {
            match self.tick().await? {
                ScriptStatus::Failed { task } => return Err(RuntimeError::ScriptFailed { task }),
                ScriptStatus::Idle => return Ok(ScriptStatus::Idle),
                status if status.is_settled() => return Ok(status),
                _ => between(),
            }
        }
        Err(RuntimeError::TickBudgetExhausted { ticks: max_ticks })
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Task` - Task lifecycle and per-pass progress
    /// - `Topic::Script` - Script finished, failed or aborted
    /// - `Topic::Requirement` - Narrator text and quantity changes
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
