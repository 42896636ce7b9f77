use crate::state::{NameFilter, Npc};

/// Resolves interaction targets among the currently loaded NPCs.
pub trait NpcOracle: Send + Sync {
    /// Returns the closest loaded NPC whose name satisfies `filter`.
    fn find_npc(&self, filter: &NameFilter) -> Option<Npc>;
}
