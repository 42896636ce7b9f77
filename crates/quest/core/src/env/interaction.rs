use crate::state::{Npc, WorldPoint};

/// Commands that change the world. Every call may be rejected by the host.
pub trait InteractionOracle: Send + Sync {
    /// Starts long-distance travel towards `destination`.
    ///
    /// Returns `false` if no route could be started.
    fn walk_to(&self, destination: WorldPoint) -> bool;

    /// Issues a menu interaction (`verb`, e.g. "Talk-to") on `npc`.
    ///
    /// Returns `false` if the command was rejected, typically because the
    /// target despawned between lookup and action.
    fn interact(&self, npc: &Npc, verb: &str) -> bool;
}
