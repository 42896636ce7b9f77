//! Talk to an NPC and drive the resulting conversation.
//!
//! Each pass re-enters at [`TaskPhase::Locating`]. If the target is not loaded
//! or has no reachable tile, the pass is spent travelling towards the declared
//! location. Otherwise the task interacts, waits for arrival and for the
//! conversation window, then resolves the dialogue with the primary choices
//! and, failing that, the backup choices.
//!
//! Attempt counters are never reset between passes: a target that keeps
//! disappearing cannot keep the task alive forever.
use tracing::{debug, info, warn};

use super::{AttemptCounter, DistanceCache, PathDistance, Task, TaskPhase, TaskProgress, TaskStatus};
use crate::config::TaskConfig;
use crate::env::{PcgRng, TaskEnv};
use crate::error::{AttemptKind, TaskError};
use crate::jitter::Jitter;
use crate::state::{NameFilter, Npc, WorldPoint};
use crate::wait::WaitGate;

const DEFAULT_VERB: &str = "Talk-to";

/// Objective: start a conversation with an NPC and answer it as scripted.
#[derive(Clone, Debug)]
pub struct TalkToNpcTask {
    name: String,
    target: NameFilter,
    location: WorldPoint,
    verb: String,
    choices: Vec<String>,
    backup_choices: Option<Vec<String>>,
    config: TaskConfig,

    status: TaskStatus,
    phase: TaskPhase,
    walk_attempts: AttemptCounter,
    talk_attempts: AttemptCounter,
    distance: DistanceCache,
    jitter: Jitter,
    failure: Option<TaskError>,
    last_setback: Option<TaskError>,
}

/// Phase transitions inside one pass, carrying what earlier phases resolved.
enum Step {
    Locate,
    Travel,
    Interact { npc: Npc, tile: WorldPoint },
    AwaitArrival { npc: Npc, tile: WorldPoint },
    AwaitDialogue { npc: Npc },
    Resolve { npc: Npc },
    /// End of pass; the task stays pending.
    Yield,
    Succeed,
    Fail(TaskError),
}

impl Step {
    fn phase(&self) -> Option<TaskPhase> {
        match self {
            Step::Locate => Some(TaskPhase::Locating),
            Step::Travel => Some(TaskPhase::Traveling),
            Step::Interact { .. } => Some(TaskPhase::Interacting),
            Step::AwaitArrival { .. } => Some(TaskPhase::AwaitingArrival),
            Step::AwaitDialogue { .. } => Some(TaskPhase::AwaitingDialogue),
            Step::Resolve { .. } => Some(TaskPhase::ResolvingDialogue),
            Step::Yield | Step::Succeed | Step::Fail(_) => None,
        }
    }
}

impl TalkToNpcTask {
    pub fn builder(npc_name: impl Into<String>, location: WorldPoint) -> TalkToNpcTaskBuilder {
        TalkToNpcTaskBuilder::new(npc_name, location)
    }

    /// Task with the default `Talk-to` verb, no backup choices and default config.
    pub fn new(npc_name: impl Into<String>, location: WorldPoint, choices: Vec<String>) -> Self {
        Self::builder(npc_name, location).choices(choices).build()
    }

    pub fn target(&self) -> &NameFilter {
        &self.target
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn backup_choices(&self) -> Option<&[String]> {
        self.backup_choices.as_deref()
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn walk_attempts(&self) -> u32 {
        self.walk_attempts.count()
    }

    pub fn talk_attempts(&self) -> u32 {
        self.talk_attempts.count()
    }

    /// Most recent transient setback, kept for diagnostics.
    pub fn last_setback(&self) -> Option<&TaskError> {
        self.last_setback.as_ref()
    }

    fn locate(&mut self, env: &TaskEnv<'_>) -> Step {
        if self.talk_attempts.is_exhausted() {
            return Step::Fail(TaskError::AttemptBudgetExceeded {
                kind: AttemptKind::Talk,
                ceiling: self.talk_attempts.ceiling(),
            });
        }

        let npc = env.npcs().find_npc(&self.target);
        let tile = npc.as_ref().and_then(|npc| {
            env.reach()
                .nearest_reachable_tile(npc.location, self.config.reach_radius)
        });

        match (npc, tile) {
            (Some(npc), Some(tile)) => Step::Interact { npc, tile },
            _ => Step::Travel,
        }
    }

    fn travel(&mut self, env: &TaskEnv<'_>, gate: &WaitGate<'_>) -> Step {
        if !self.walk_attempts.record() {
            return Step::Fail(TaskError::AttemptBudgetExceeded {
                kind: AttemptKind::Walk,
                ceiling: self.walk_attempts.ceiling(),
            });
        }
        self.last_setback = Some(TaskError::TargetUnreachable {
            target: self.target.to_string(),
        });

        let attempt = self.walk_attempts.count();
        if env.interaction().walk_to(self.location) {
            let world = env.world();
            let location = self.location;
            let tolerance = self.config.arrival_tolerance;
            let timeout = self.jitter.uniform(self.config.timing.walk_settle);
            let arrived = gate.wait_until(timeout, || {
                !world.is_moving() && world.distance_to(location) <= tolerance
            });
            info!(
                target: "quest::task",
                task = %self.name,
                attempt,
                arrived,
                "Walked towards target location"
            );
        } else {
            self.last_setback = Some(TaskError::WalkRejected {
                destination: self.location.to_string(),
            });
            info!(
                target: "quest::task",
                task = %self.name,
                attempt,
                destination = %self.location,
                "Failed to start travel towards target location"
            );
        }
        Step::Yield
    }

    fn interact(&mut self, env: &TaskEnv<'_>, npc: Npc, tile: WorldPoint) -> Step {
        if !env.interaction().interact(&npc, &self.verb) {
            return Step::Fail(self.rejected(&npc));
        }
        Step::AwaitArrival { npc, tile }
    }

    fn await_arrival(
        &mut self,
        env: &TaskEnv<'_>,
        gate: &WaitGate<'_>,
        npc: Npc,
        tile: WorldPoint,
    ) -> Step {
        let world = env.world();
        let distance = env
            .reach()
            .travel_distance(tile)
            .unwrap_or_else(|| world.distance_to(tile));

        if distance > 1 {
            let timeout = self.jitter.uniform(self.config.timing.movement_start);
            gate.wait_until(timeout, || world.is_moving());
        }

        let per_tile = self.config.ms_per_tile(world.is_run_enabled());
        let slack = self.jitter.normal(self.config.timing.arrival_slack);
        let timeout = u64::from(distance).saturating_mul(per_tile).saturating_add(slack);
        let adjacent = self.config.reach_radius;
        let target = npc.location;
        gate.wait_until(timeout, || {
            !world.is_moving() || world.player_location().distance_to(target) <= adjacent
        });

        debug!(
            target: "quest::task",
            task = %self.name,
            distance,
            timeout,
            "Arrival wait finished"
        );
        Step::AwaitDialogue { npc }
    }

    fn await_dialogue(&mut self, env: &TaskEnv<'_>, gate: &WaitGate<'_>, npc: Npc) -> Step {
        let dialogue = env.dialogue();
        let timeout = self.jitter.uniform(self.config.timing.dialogue_open);
        if gate.wait_until(timeout, || dialogue.is_conversation_open()) {
            return Step::Resolve { npc };
        }

        self.talk_attempts.record();
        self.last_setback = Some(TaskError::DialogueNotOpened);
        info!(
            target: "quest::task",
            task = %self.name,
            talk_attempts = self.talk_attempts.count(),
            "Timed out while waiting for conversation window"
        );
        Step::Yield
    }

    fn resolve(&mut self, env: &TaskEnv<'_>, gate: &WaitGate<'_>, npc: Npc) -> Step {
        let dialogue = env.dialogue();
        if dialogue.handle_in_order(&self.choices) {
            return Step::Succeed;
        }

        let Some(backup) = self.backup_choices.as_deref() else {
            return Step::Fail(TaskError::DialogueUnresolved { used_backup: false });
        };

        info!(target: "quest::task", task = %self.name, "Using backup dialogue options");
        if !env.interaction().interact(&npc, &self.verb) {
            return Step::Fail(self.rejected(&npc));
        }
        gate.sleep(self.jitter.normal(self.config.timing.backup_delay));

        if dialogue.handle_in_order(backup) {
            Step::Succeed
        } else {
            Step::Fail(TaskError::DialogueUnresolved { used_backup: true })
        }
    }

    fn rejected(&self, npc: &Npc) -> TaskError {
        TaskError::CommandRejected {
            target: npc.name.clone(),
            verb: self.verb.clone(),
        }
    }

    fn succeed(&mut self) {
        self.status = TaskStatus::Completed;
        self.phase = TaskPhase::Succeeded;
        info!(
            target: "quest::task",
            task = %self.name,
            walk_attempts = self.walk_attempts.count(),
            talk_attempts = self.talk_attempts.count(),
            "Task completed"
        );
    }

    fn fail(&mut self, reason: TaskError) {
        warn!(
            target: "quest::task",
            task = %self.name,
            phase = %self.phase,
            code = reason.error_code(),
            error = %reason,
            "Task failed"
        );
        self.status = TaskStatus::Failed;
        self.phase = TaskPhase::Failed;
        self.failure = Some(reason);
    }
}

impl Task for TalkToNpcTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> WorldPoint {
        self.location
    }

    fn execute(&mut self, env: &TaskEnv<'_>) -> bool {
        if !self.is_pending() {
            return false;
        }

        let gate = WaitGate::new(env.clock(), self.config.poll_interval_ms);
        let mut step = Step::Locate;
        loop {
            if let Some(phase) = step.phase() {
                self.phase = phase;
            }
            step = match step {
                Step::Locate => self.locate(env),
                Step::Travel => self.travel(env, &gate),
                Step::Interact { npc, tile } => self.interact(env, npc, tile),
                Step::AwaitArrival { npc, tile } => self.await_arrival(env, &gate, npc, tile),
                Step::AwaitDialogue { npc } => self.await_dialogue(env, &gate, npc),
                Step::Resolve { npc } => self.resolve(env, &gate, npc),
                Step::Yield => return true,
                Step::Succeed => {
                    self.succeed();
                    return true;
                }
                Step::Fail(reason) => {
                    self.fail(reason);
                    return false;
                }
            };
        }
    }

    fn status(&self) -> TaskStatus {
        self.status
    }

    fn distance(&mut self, env: &TaskEnv<'_>) -> PathDistance {
        self.distance.query(env, self.location)
    }

    fn progress(&self) -> TaskProgress {
        TaskProgress {
            phase: self.phase,
            walk_attempts: self.walk_attempts.count(),
            talk_attempts: self.talk_attempts.count(),
        }
    }

    fn failure(&self) -> Option<&TaskError> {
        self.failure.as_ref()
    }
}

/// Builder for [`TalkToNpcTask`].
#[derive(Clone, Debug)]
pub struct TalkToNpcTaskBuilder {
    npc_name: String,
    target: Option<NameFilter>,
    location: WorldPoint,
    verb: String,
    choices: Vec<String>,
    backup_choices: Option<Vec<String>>,
    config: TaskConfig,
    seed: u64,
    context: u32,
}

impl TalkToNpcTaskBuilder {
    fn new(npc_name: impl Into<String>, location: WorldPoint) -> Self {
        Self {
            npc_name: npc_name.into(),
            target: None,
            location,
            verb: DEFAULT_VERB.to_string(),
            choices: Vec::new(),
            backup_choices: None,
            config: TaskConfig::default(),
            seed: 0,
            context: 0,
        }
    }

    /// Overrides the default name filter (`Contains(npc_name)`).
    pub fn filter(mut self, filter: NameFilter) -> Self {
        self.target = Some(filter);
        self
    }

    pub fn verb(mut self, verb: impl Into<String>) -> Self {
        self.verb = verb.into();
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn backup_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backup_choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn config(mut self, config: TaskConfig) -> Self {
        self.config = config;
        self
    }

    /// Seeds the timing jitter. `context` separates tasks sharing one seed.
    pub fn seed(mut self, seed: u64, context: u32) -> Self {
        self.seed = seed;
        self.context = context;
        self
    }

    pub fn build(self) -> TalkToNpcTask {
        let target = self
            .target
            .unwrap_or_else(|| NameFilter::contains(self.npc_name.clone()));
        TalkToNpcTask {
            name: format!("Talk to {}", self.npc_name),
            target,
            location: self.location,
            verb: self.verb,
            choices: self.choices,
            backup_choices: self.backup_choices,
            status: TaskStatus::Pending,
            phase: TaskPhase::Locating,
            walk_attempts: AttemptCounter::new(self.config.max_walk_attempts),
            talk_attempts: AttemptCounter::new(self.config.max_talk_attempts),
            distance: DistanceCache::new(self.config.distance_freshness_ticks),
            jitter: Jitter::with_rng(PcgRng, self.seed, self.context),
            failure: None,
            last_setback: None,
            config: self.config,
        }
    }
}
