use crate::jitter::TimingRange;

/// Tunable parameters of task execution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TaskConfig {
    /// Ceiling on travel attempts before a task fails as unreachable.
    pub max_walk_attempts: u32,
    /// Ceiling on conversation attempts before a task fails.
    pub max_talk_attempts: u32,
    /// Ticks a memoized path distance stays valid.
    pub distance_freshness_ticks: u64,
    /// Radius around the target searched for a reachable tile.
    pub reach_radius: u32,
    /// How close to the declared location a walk must end to count as arrived.
    pub arrival_tolerance: u32,
    /// Cadence of predicate checks inside waits.
    pub poll_interval_ms: u64,
    /// Expected travel time per tile while running.
    pub run_ms_per_tile: u64,
    /// Expected travel time per tile while walking.
    pub walk_ms_per_tile: u64,
    pub timing: TimingConfig,
}

impl TaskConfig {
    pub const DEFAULT_MAX_WALK_ATTEMPTS: u32 = 5;
    pub const DEFAULT_MAX_TALK_ATTEMPTS: u32 = 5;
    pub const DEFAULT_DISTANCE_FRESHNESS_TICKS: u64 = 30;
    pub const DEFAULT_REACH_RADIUS: u32 = 1;
    pub const DEFAULT_ARRIVAL_TOLERANCE: u32 = 2;
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
    pub const DEFAULT_RUN_MS_PER_TILE: u64 = 300;
    pub const DEFAULT_WALK_MS_PER_TILE: u64 = 600;

    pub fn new() -> Self {
        Self {
            max_walk_attempts: Self::DEFAULT_MAX_WALK_ATTEMPTS,
            max_talk_attempts: Self::DEFAULT_MAX_TALK_ATTEMPTS,
            distance_freshness_ticks: Self::DEFAULT_DISTANCE_FRESHNESS_TICKS,
            reach_radius: Self::DEFAULT_REACH_RADIUS,
            arrival_tolerance: Self::DEFAULT_ARRIVAL_TOLERANCE,
            poll_interval_ms: Self::DEFAULT_POLL_INTERVAL_MS,
            run_ms_per_tile: Self::DEFAULT_RUN_MS_PER_TILE,
            walk_ms_per_tile: Self::DEFAULT_WALK_MS_PER_TILE,
            timing: TimingConfig::default(),
        }
    }

    /// Per-tile travel time for the current movement mode.
    pub fn ms_per_tile(&self, running: bool) -> u64 {
        if running {
            self.run_ms_per_tile
        } else {
            self.walk_ms_per_tile
        }
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Jittered timeout ranges for each wait in a task step.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    /// Settling wait after a long-distance travel command.
    pub walk_settle: TimingRange,
    /// Wait for movement to begin after interacting with a distant target.
    pub movement_start: TimingRange,
    /// Slack added on top of the distance-proportional arrival timeout (normal draw).
    pub arrival_slack: TimingRange,
    /// Wait for the conversation window to open.
    pub dialogue_open: TimingRange,
    /// Pause before resolving the backup dialogue (normal draw).
    pub backup_delay: TimingRange,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            walk_settle: TimingRange::new(2500, 3100),
            movement_start: TimingRange::new(800, 1400),
            arrival_slack: TimingRange::new(1900, 2800),
            dialogue_open: TimingRange::new(1300, 1900),
            backup_delay: TimingRange::new(1900, 2800),
        }
    }
}
