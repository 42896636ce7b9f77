//! Script worker that owns the [`TaskRunner`] and every registered narrator.
//!
//! The worker is the single cooperative callback path: it runs on one blocking
//! thread and handles commands strictly in order, so narrator refreshes and
//! task steps never overlap. Task waits block this thread only, never the
//! async runtime that delivers commands.
use std::sync::Arc;

use quest_core::{
    HostOracles, Narrator, Pass, ScriptStatus, Task, TaskEnv, TaskReport, TaskRunner, Tick,
    WorldOracle,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::events::{EventBus, RequirementEvent, ScriptEvent, TaskEvent};

/// Commands that can be sent to the script worker
pub enum Command {
    /// Refresh narrators, then run one scheduling pass.
    Tick {
        reply: oneshot::Sender<ScriptStatus>,
    },
    /// Append a task to the runner; replies with its index.
    Enqueue {
        task: Box<dyn Task>,
        reply: oneshot::Sender<usize>,
    },
    /// Stop invoking tasks from the next pass on.
    Abort {
        reply: oneshot::Sender<ScriptStatus>,
    },
    QueryStatus {
        reply: oneshot::Sender<ScriptStatus>,
    },
    QueryReports {
        reply: oneshot::Sender<Vec<TaskReport>>,
    },
}

struct Narrated {
    narrator: Box<dyn Narrator>,
    last_text: Option<String>,
}

/// Background worker that drives the task runner.
pub struct ScriptWorker<H> {
    host: Arc<H>,
    runner: TaskRunner,
    narrators: Vec<Narrated>,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    active: Option<usize>,
}

impl<H: HostOracles + 'static> ScriptWorker<H> {
    pub fn new(
        host: Arc<H>,
        runner: TaskRunner,
        narrators: Vec<Box<dyn Narrator>>,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            target: "runtime::worker",
            queued = runner.queued(),
            narrators = narrators.len(),
            policy = %runner.policy(),
            "ScriptWorker initialized"
        );

        Self {
            host,
            runner,
            narrators: narrators
                .into_iter()
                .map(|narrator| Narrated {
                    narrator,
                    last_text: None,
                })
                .collect(),
            command_rx,
            event_bus,
            active: None,
        }
    }

    /// Main worker loop. Must run on a thread that may block.
    pub fn run(mut self) {
        while let Some(cmd) = self.command_rx.blocking_recv() {
            self.handle_command(cmd);
        }
        debug!(target: "runtime::worker", "Command channel closed; worker exiting");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Tick { reply } => {
                let status = self.tick();
                if reply.send(status).is_err() {
                    debug!(
                        target: "runtime::worker",
                        "Tick reply channel closed (caller dropped)"
                    );
                }
            }
            Command::Enqueue { task, reply } => {
                let index = self.runner.push(task);
                if reply.send(index).is_err() {
                    debug!(
                        target: "runtime::worker",
                        "Enqueue reply channel closed (caller dropped)"
                    );
                }
            }
            Command::Abort { reply } => {
                let was_halted = self.runner.status().is_halted();
                self.runner.abort();
                if !was_halted && *self.runner.status() == ScriptStatus::Aborted {
                    self.event_bus.publish(ScriptEvent::ScriptAborted);
                }
                if reply.send(self.runner.status().clone()).is_err() {
                    debug!(
                        target: "runtime::worker",
                        "Abort reply channel closed (caller dropped)"
                    );
                }
            }
            Command::QueryStatus { reply } => {
                if reply.send(self.runner.status().clone()).is_err() {
                    debug!(
                        target: "runtime::worker",
                        "QueryStatus reply channel closed (caller dropped)"
                    );
                }
            }
            Command::QueryReports { reply } => {
                if reply.send(self.runner.reports().to_vec()).is_err() {
                    debug!(
                        target: "runtime::worker",
                        "QueryReports reply channel closed (caller dropped)"
                    );
                }
            }
        }
    }

    fn tick(&mut self) -> ScriptStatus {
        let host = Arc::clone(&self.host);
        let env = TaskEnv::from_host(host.as_ref());
        let tick = env.world().current_tick();

        self.narrate(env.world(), tick);
        let pass = self.runner.poll(&env);
        self.publish_pass(pass);

        self.runner.status().clone()
    }

    /// Refreshes every narrator unconditionally; publishes changed text only.
    fn narrate(&mut self, world: &dyn WorldOracle, tick: Tick) {
        for (index, narrated) in self.narrators.iter_mut().enumerate() {
            narrated.narrator.on_tick(world);
            let text = narrated.narrator.text();
            if narrated.last_text.as_deref() == Some(text) {
                continue;
            }
            let quantity = narrated
                .narrator
                .requirements()
                .first()
                .map(|requirement| requirement.quantity);
            debug!(
                target: "runtime::worker",
                narrator = index,
                tick = tick.0,
                text,
                "Requirement updated"
            );
            narrated.last_text = Some(text.to_string());
            self.event_bus.publish(RequirementEvent::RequirementUpdated {
                narrator: index,
                tick,
                text: text.to_string(),
                quantity,
            });
        }
    }

    fn publish_pass(&mut self, pass: Pass) {
        if let Some(report) = pass.report()
            && self.active != Some(report.index)
        {
            self.active = Some(report.index);
            self.event_bus.publish(TaskEvent::TaskStarted {
                index: report.index,
                name: report.name.clone(),
            });
        }

        match pass {
            Pass::Continued(report) => {
                self.event_bus.publish(TaskEvent::TaskProgressed {
                    index: report.index,
                    name: report.name,
                    phase: report.progress.phase,
                    walk_attempts: report.progress.walk_attempts,
                    talk_attempts: report.progress.talk_attempts,
                });
            }
            Pass::Completed(report) => {
                self.active = None;
                self.event_bus.publish(TaskEvent::TaskCompleted { report });
                if *self.runner.status() == ScriptStatus::Succeeded {
                    let completed = self.runner.reports().len();
                    info!(target: "runtime::worker", completed, "Script finished");
                    self.event_bus
                        .publish(ScriptEvent::ScriptFinished { completed });
                }
            }
            Pass::Failed { report, reason } => {
                self.active = None;
                let task = report.name.clone();
                let reason = reason
                    .map(|reason| reason.to_string())
                    .or_else(|| report.failure.clone());
                warn!(
                    target: "runtime::worker",
                    task = %task,
                    reason = reason.as_deref().unwrap_or("halted while pending"),
                    "Script failed"
                );
                self.event_bus.publish(TaskEvent::TaskFailed { report, reason });
                self.event_bus.publish(ScriptEvent::ScriptFailed { task });
            }
            Pass::Finished | Pass::Halted => {}
        }
    }
}
