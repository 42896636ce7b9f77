use crate::state::WorldPoint;

/// Local pathfinding over the region currently loaded around the player.
///
/// Cheap compared to [`super::PathOracle`] but only answers for nearby tiles.
pub trait ReachOracle: Send + Sync {
    /// Nearest tile within `radius` of `point` the player can walk to, if any.
    fn nearest_reachable_tile(&self, point: WorldPoint, radius: u32) -> Option<WorldPoint>;

    /// Walking distance in tiles from the player to a reachable `tile`.
    fn travel_distance(&self, tile: WorldPoint) -> Option<u32>;
}
