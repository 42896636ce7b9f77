//! Scheduler that drives tasks one pass at a time.
//!
//! The runner behaves like a sequence node: one task is active at a time and
//! is re-invoked on every [`TaskRunner::poll`] while it is pending. A completed
//! task advances the script; a failed one halts it. There is no cross-task
//! retry, the caller decides what to do with a failed script.
use tracing::{debug, info, warn};

use crate::env::TaskEnv;
use crate::error::TaskError;
use crate::task::{PathDistance, Task, TaskProgress, TaskStatus};

/// How the next task is picked once the active one settles.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::AsRefStr,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum SelectionPolicy {
    /// Queue order.
    #[default]
    InOrder,
    /// Smallest cached path distance first; ties keep queue order.
    Nearest,
}

/// Script-level state observed by the runner's caller.
#[derive(Clone, Debug, PartialEq, Eq, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ScriptStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed {
        task: String,
    },
    Aborted,
}

impl ScriptStatus {
    /// No further task will be invoked without new work or a new runner.
    pub fn is_settled(&self) -> bool {
        !matches!(self, ScriptStatus::Idle | ScriptStatus::Running)
    }

    /// The script cannot make progress anymore.
    pub fn is_halted(&self) -> bool {
        matches!(self, ScriptStatus::Failed { .. } | ScriptStatus::Aborted)
    }
}

/// Snapshot of one task as seen by the runner.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskReport {
    /// Position in push order.
    pub index: usize,
    pub name: String,
    pub status: TaskStatus,
    pub progress: TaskProgress,
    pub failure: Option<String>,
}

/// Outcome of one [`TaskRunner::poll`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pass {
    /// The active task ran and is still pending.
    Continued(TaskReport),
    Completed(TaskReport),
    /// The active task failed; the script is halted.
    ///
    /// `reason` is `None` when the task halted without recording one.
    Failed {
        report: TaskReport,
        reason: Option<TaskError>,
    },
    /// Nothing left to run.
    Finished,
    /// The runner was aborted or a task already failed.
    Halted,
}

impl Pass {
    pub fn report(&self) -> Option<&TaskReport> {
        match self {
            Pass::Continued(report) | Pass::Completed(report) | Pass::Failed { report, .. } => {
                Some(report)
            }
            Pass::Finished | Pass::Halted => None,
        }
    }
}

struct Entry {
    index: usize,
    task: Box<dyn Task>,
}

impl Entry {
    fn report(&self, status: TaskStatus) -> TaskReport {
        TaskReport {
            index: self.index,
            name: self.task.name().to_string(),
            status,
            progress: self.task.progress(),
            failure: self.task.failure().map(ToString::to_string),
        }
    }
}

/// Ordered collection of tasks with one active task at a time.
#[derive(Default)]
pub struct TaskRunner {
    policy: SelectionPolicy,
    queue: Vec<Entry>,
    active: Option<Entry>,
    reports: Vec<TaskReport>,
    status: ScriptStatus,
    next_index: usize,
}

impl TaskRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Appends a task; returns its index in push order.
    pub fn push(&mut self, task: Box<dyn Task>) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        debug!(
            target: "quest::runner",
            index,
            task = task.name(),
            "Task queued"
        );
        self.queue.push(Entry { index, task });
        if self.status == ScriptStatus::Succeeded {
            self.status = ScriptStatus::Running;
        }
        index
    }

    pub fn status(&self) -> &ScriptStatus {
        &self.status
    }

    /// Reports of every task that left the pending state, in settlement order.
    pub fn reports(&self) -> &[TaskReport] {
        &self.reports
    }

    pub fn active(&self) -> Option<&dyn Task> {
        self.active.as_ref().map(|entry| entry.task.as_ref())
    }

    /// Tasks waiting to be activated, excluding the active one.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }

    /// Stops invoking tasks. Takes effect at the next pass boundary.
    pub fn abort(&mut self) {
        if self.status.is_halted() {
            return;
        }
        let task = self.active.as_ref().map(|entry| entry.task.name().to_string());
        info!(
            target: "quest::runner",
            task = task.as_deref().unwrap_or("-"),
            queued = self.queue.len(),
            "Script aborted"
        );
        self.status = ScriptStatus::Aborted;
    }

    /// Runs one scheduling pass.
    pub fn poll(&mut self, env: &TaskEnv<'_>) -> Pass {
        if self.status.is_halted() {
            return Pass::Halted;
        }

        let Some(mut entry) = self.active.take().or_else(|| self.select(env)) else {
            if !self.reports.is_empty() {
                self.status = ScriptStatus::Succeeded;
            }
            return Pass::Finished;
        };
        self.status = ScriptStatus::Running;

        let proceed = entry.task.is_pending() && entry.task.execute(env);
        match entry.task.status() {
            TaskStatus::Pending if proceed => {
                let report = entry.report(TaskStatus::Pending);
                self.active = Some(entry);
                Pass::Continued(report)
            }
            TaskStatus::Completed => {
                let report = entry.report(TaskStatus::Completed);
                info!(
                    target: "quest::runner",
                    index = report.index,
                    task = %report.name,
                    walk_attempts = report.progress.walk_attempts,
                    talk_attempts = report.progress.talk_attempts,
                    "Task completed"
                );
                self.reports.push(report.clone());
                if self.queue.is_empty() {
                    self.status = ScriptStatus::Succeeded;
                }
                Pass::Completed(report)
            }
            TaskStatus::Pending | TaskStatus::Failed => {
                let report = entry.report(TaskStatus::Failed);
                let reason = entry.task.failure().cloned();
                warn!(
                    target: "quest::runner",
                    index = report.index,
                    task = %report.name,
                    reason = report.failure.as_deref().unwrap_or("halted while pending"),
                    "Task failed; halting script"
                );
                self.status = ScriptStatus::Failed {
                    task: report.name.clone(),
                };
                self.reports.push(report.clone());
                Pass::Failed { report, reason }
            }
        }
    }

    fn select(&mut self, env: &TaskEnv<'_>) -> Option<Entry> {
        if self.queue.is_empty() {
            return None;
        }
        let position = match self.policy {
            SelectionPolicy::InOrder => 0,
            SelectionPolicy::Nearest => self.nearest(env),
        };
        let entry = self.queue.remove(position);
        info!(
            target: "quest::runner",
            index = entry.index,
            task = entry.task.name(),
            policy = %self.policy,
            "Task started"
        );
        Some(entry)
    }

    fn nearest(&mut self, env: &TaskEnv<'_>) -> usize {
        let distances: Vec<PathDistance> = self
            .queue
            .iter_mut()
            .map(|entry| entry.task.distance(env))
            .collect();
        distances
            .iter()
            .enumerate()
            .min_by_key(|(_, distance)| **distance)
            .map(|(position, _)| position)
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for TaskRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRunner")
            .field("policy", &self.policy)
            .field("status", &self.status)
            .field("active", &self.active.as_ref().map(|entry| entry.task.name()))
            .field("queued", &self.queue.len())
            .field("reports", &self.reports.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::error::AttemptKind;
    use crate::state::WorldPoint;
    use crate::testing::MockHost;

    /// Task whose outcomes are scripted per pass.
    struct Scripted {
        name: String,
        outcomes: VecDeque<(TaskStatus, bool)>,
        status: TaskStatus,
        distance: u32,
    }

    impl Scripted {
        fn new(name: &str, outcomes: &[(TaskStatus, bool)]) -> Self {
            Self {
                name: name.to_string(),
                outcomes: outcomes.iter().copied().collect(),
                status: TaskStatus::Pending,
                distance: 0,
            }
        }

        fn at(mut self, distance: u32) -> Self {
            self.distance = distance;
            self
        }
    }

    const PENDING: (TaskStatus, bool) = (TaskStatus::Pending, true);
    const DONE: (TaskStatus, bool) = (TaskStatus::Completed, true);
    const FAIL: (TaskStatus, bool) = (TaskStatus::Failed, false);

    impl Task for Scripted {
        fn name(&self) -> &str {
            &self.name
        }

        fn location(&self) -> WorldPoint {
            WorldPoint::new(0, 0, 0)
        }

        fn execute(&mut self, _env: &TaskEnv<'_>) -> bool {
            let (status, proceed) = self.outcomes.pop_front().unwrap_or(DONE);
            self.status = status;
            proceed
        }

        fn status(&self) -> TaskStatus {
            self.status
        }

        fn distance(&mut self, _env: &TaskEnv<'_>) -> PathDistance {
            PathDistance::Cost(self.distance)
        }
    }

    fn names(runner: &TaskRunner) -> Vec<String> {
        runner.reports().iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn empty_runner_finishes_idle() {
        let host = MockHost::default();
        let env = TaskEnv::from_host(&host);
        let mut runner = TaskRunner::new();

        assert_eq!(runner.poll(&env), Pass::Finished);
        assert_eq!(runner.status(), &ScriptStatus::Idle);
    }

    #[test]
    fn reinvokes_pending_task_until_completion() {
        let host = MockHost::default();
        let env = TaskEnv::from_host(&host);
        let mut runner = TaskRunner::new();
        runner.push(Box::new(Scripted::new("a", &[PENDING, PENDING, DONE])));
        runner.push(Box::new(Scripted::new("b", &[DONE])));

        assert!(matches!(runner.poll(&env), Pass::Continued(r) if r.name == "a"));
        assert!(matches!(runner.poll(&env), Pass::Continued(r) if r.name == "a"));
        assert_eq!(runner.status(), &ScriptStatus::Running);
        assert!(matches!(runner.poll(&env), Pass::Completed(r) if r.name == "a"));
        assert!(matches!(runner.poll(&env), Pass::Completed(r) if r.name == "b"));
        assert_eq!(runner.status(), &ScriptStatus::Succeeded);
        assert_eq!(runner.poll(&env), Pass::Finished);
        assert_eq!(names(&runner), vec!["a", "b"]);
    }

    #[test]
    fn failure_halts_script() {
        let host = MockHost::default();
        let env = TaskEnv::from_host(&host);
        let mut runner = TaskRunner::new();
        runner.push(Box::new(Scripted::new("a", &[FAIL])));
        runner.push(Box::new(Scripted::new("b", &[DONE])));

        assert!(matches!(runner.poll(&env), Pass::Failed { report, .. } if report.name == "a"));
        assert_eq!(
            runner.status(),
            &ScriptStatus::Failed {
                task: "a".to_string()
            }
        );
        assert_eq!(runner.poll(&env), Pass::Halted);
        assert_eq!(runner.queued(), 1);
    }

    #[test]
    fn halt_signal_while_pending_counts_as_failure() {
        let host = MockHost::default();
        let env = TaskEnv::from_host(&host);
        let mut runner = TaskRunner::new();
        runner.push(Box::new(Scripted::new("a", &[(TaskStatus::Pending, false)])));

        let pass = runner.poll(&env);
        let Pass::Failed { report, reason } = pass else {
            panic!("expected failure, got {pass:?}");
        };
        assert_eq!(report.status, TaskStatus::Failed);
        assert_eq!(reason, None);
        assert!(runner.status().is_halted());
    }

    #[test]
    fn abort_takes_effect_at_next_pass() {
        let host = MockHost::default();
        let env = TaskEnv::from_host(&host);
        let mut runner = TaskRunner::new();
        runner.push(Box::new(Scripted::new("a", &[PENDING, PENDING])));

        assert!(matches!(runner.poll(&env), Pass::Continued(_)));
        runner.abort();
        assert_eq!(runner.poll(&env), Pass::Halted);
        assert_eq!(runner.status(), &ScriptStatus::Aborted);
        assert_eq!(runner.active().map(|task| task.name()), Some("a"));
    }

    #[test]
    fn nearest_policy_prefers_short_paths() {
        let host = MockHost::default();
        let env = TaskEnv::from_host(&host);
        let mut runner = TaskRunner::with_policy(SelectionPolicy::Nearest);
        runner.push(Box::new(Scripted::new("far", &[DONE]).at(40)));
        runner.push(Box::new(Scripted::new("near", &[DONE]).at(3)));
        runner.push(Box::new(Scripted::new("tie", &[DONE]).at(3)));

        while runner.poll(&env) != Pass::Finished {}
        assert_eq!(names(&runner), vec!["near", "tie", "far"]);
    }

    #[test]
    fn push_after_success_resumes() {
        let host = MockHost::default();
        let env = TaskEnv::from_host(&host);
        let mut runner = TaskRunner::new();
        runner.push(Box::new(Scripted::new("a", &[DONE])));
        runner.poll(&env);
        assert_eq!(runner.status(), &ScriptStatus::Succeeded);

        let index = runner.push(Box::new(Scripted::new("b", &[DONE])));
        assert_eq!(index, 1);
        assert_eq!(runner.status(), &ScriptStatus::Running);
        assert!(matches!(runner.poll(&env), Pass::Completed(r) if r.index == 1));
    }

    #[test]
    fn drives_talk_task_to_budget_failure() {
        use crate::task::TalkToNpcTask;

        let host = MockHost::new(|s| s.npc = None);
        let env = TaskEnv::from_host(&host);
        let mut runner = TaskRunner::new();
        runner.push(Box::new(TalkToNpcTask::new(
            "My Arm",
            WorldPoint::new(2831, 3696, 0),
            vec!["Yes".to_string()],
        )));

        let mut passes = 0;
        let reason = loop {
            passes += 1;
            if let Pass::Failed { reason, .. } = runner.poll(&env) {
                break reason;
            }
        };
        assert_eq!(passes, 6);
        assert_eq!(
            reason,
            Some(TaskError::AttemptBudgetExceeded {
                kind: AttemptKind::Walk,
                ceiling: 5
            })
        );
        assert_eq!(runner.reports()[0].progress.walk_attempts, 5);
        assert!(runner.reports()[0].failure.is_some());
    }
}
