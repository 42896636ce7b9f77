//! High-level runtime orchestrator.
//!
//! The runtime owns the script worker, wires up the command channel and the
//! event bus, and exposes a builder-based API for hosts to drive a script.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use quest_core::{HostOracles, Narrator, SelectionPolicy, Task, TaskConfig, TaskRunner};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Command, ScriptWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Defaults for tasks the host builds (scenario loading, CLI).
    pub task_config: TaskConfig,
    pub selection: SelectionPolicy,
    /// Base seed for task timing jitter.
    pub seed: u64,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            task_config: TaskConfig::default(),
            selection: SelectionPolicy::default(),
            seed: 0,
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that orchestrates script execution
///
/// Design: Runtime owns the worker and coordinates shutdown.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    config: RuntimeConfig,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Subscribe to runtime events on one topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Other clones of the handle keep the worker alive until they drop.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
#[derive(Default)]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    tasks: Vec<Box<dyn Task>>,
    narrators: Vec<Box<dyn Narrator>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Queue a task before the worker starts
    pub fn task(mut self, task: impl Task + 'static) -> Self {
        self.tasks.push(Box::new(task));
        self
    }

    pub fn tasks(mut self, tasks: impl IntoIterator<Item = Box<dyn Task>>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Register a narrator refreshed on every tick
    pub fn narrator(mut self, narrator: impl Narrator + 'static) -> Self {
        self.narrators.push(Box::new(narrator));
        self
    }

    pub fn narrators(mut self, narrators: impl IntoIterator<Item = Box<dyn Narrator>>) -> Self {
        self.narrators.extend(narrators);
        self
    }

    /// Build the runtime and spawn the script worker on a blocking thread.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn build<H: HostOracles + 'static>(self, host: Arc<H>) -> Result<Runtime> {
        let command_buffer = self.config.command_buffer_size.max(1);
        let (command_tx, command_rx) = mpsc::channel::<Command>(command_buffer);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let mut runner = TaskRunner::with_policy(self.config.selection);
        for task in self.tasks {
            runner.push(task);
        }

        let worker = ScriptWorker::new(host, runner, self.narrators, command_rx, event_bus);
        let worker_handle = tokio::task::spawn_blocking(move || worker.run());

        Ok(Runtime {
            handle,
            config: self.config,
            worker_handle,
        })
    }
}
