use crate::state::{CounterId, Tick, WorldPoint};

/// Live, read-only view of the player and world counters.
pub trait WorldOracle: Send + Sync {
    /// Current host tick. Monotonically non-decreasing for the whole session.
    fn current_tick(&self) -> Tick;

    fn player_location(&self) -> WorldPoint;

    fn is_moving(&self) -> bool;

    fn is_run_enabled(&self) -> bool;

    /// Tile distance from the player to `point`.
    fn distance_to(&self, point: WorldPoint) -> u32 {
        self.player_location().distance_to(point)
    }

    /// Reads a live world counter (quest progress variable).
    fn counter(&self, id: CounterId) -> i32;
}
