//! Topic-based event bus implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{RequirementEvent, ScriptEvent, TaskEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Per-task lifecycle and progress
    Task,
    /// Script-level outcome
    Script,
    /// Narrator updates
    Requirement,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Task(TaskEvent),
    Script(ScriptEvent),
    Requirement(RequirementEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Task(_) => Topic::Task,
            Event::Script(_) => Topic::Script,
            Event::Requirement(_) => Topic::Requirement,
        }
    }
}

/// Topic-based event bus
///
/// Every topic owns its own broadcast channel, so a slow requirement consumer
/// never lags task subscribers. Publishing is synchronous and never blocks.
#[derive(Clone)]
pub struct EventBus {
    task: broadcast::Sender<Event>,
    script: broadcast::Sender<Event>,
    requirement: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            task: broadcast::channel(capacity).0,
            script: broadcast::channel(capacity).0,
            requirement: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Task => &self.task,
            Topic::Script => &self.script,
            Topic::Requirement => &self.requirement,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl From<TaskEvent> for Event {
    fn from(event: TaskEvent) -> Self {
        Event::Task(event)
    }
}

impl From<ScriptEvent> for Event {
    fn from(event: ScriptEvent) -> Self {
        Event::Script(event)
    }
}

impl From<RequirementEvent> for Event {
    fn from(event: RequirementEvent) -> Self {
        Event::Requirement(event)
    }
}
