//! Traits describing the host capabilities a task consumes.
//!
//! Oracles expose live world reads (player, NPCs, counters), local and remote
//! pathfinding, movement/interaction commands, dialogue handling and the clock.
//! The [`TaskEnv`] aggregate bundles them so task steps can reach everything
//! they need without coupling to a concrete game client.
mod clock;
mod dialogue;
mod interaction;
mod npc;
mod path;
mod reach;
mod rng;
mod world;

pub use clock::ClockOracle;
pub use dialogue::DialogueOracle;
pub use interaction::InteractionOracle;
pub use npc::NpcOracle;
pub use path::{PathOracle, PathResult, PathStatus, TravelerProfile};
pub use reach::ReachOracle;
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use world::WorldOracle;

/// A single host object that backs every oracle.
///
/// Implemented automatically; hosts and simulators usually implement all the
/// traits on one type and hand it to [`TaskEnv::from_host`].
pub trait HostOracles:
    WorldOracle
    + NpcOracle
    + ReachOracle
    + PathOracle
    + InteractionOracle
    + DialogueOracle
    + ClockOracle
{
}

impl<T> HostOracles for T where
    T: WorldOracle
        + NpcOracle
        + ReachOracle
        + PathOracle
        + InteractionOracle
        + DialogueOracle
        + ClockOracle
{
}

/// Aggregates the oracles required by task execution steps.
#[derive(Clone, Copy)]
pub struct TaskEnv<'a> {
    world: &'a dyn WorldOracle,
    npcs: &'a dyn NpcOracle,
    reach: &'a dyn ReachOracle,
    paths: &'a dyn PathOracle,
    interaction: &'a dyn InteractionOracle,
    dialogue: &'a dyn DialogueOracle,
    clock: &'a dyn ClockOracle,
}

impl<'a> TaskEnv<'a> {
    pub fn new(
        world: &'a dyn WorldOracle,
        npcs: &'a dyn NpcOracle,
        reach: &'a dyn ReachOracle,
        paths: &'a dyn PathOracle,
        interaction: &'a dyn InteractionOracle,
        dialogue: &'a dyn DialogueOracle,
        clock: &'a dyn ClockOracle,
    ) -> Self {
        Self {
            world,
            npcs,
            reach,
            paths,
            interaction,
            dialogue,
            clock,
        }
    }

    /// Borrows every oracle from one host object.
    pub fn from_host<H: HostOracles>(host: &'a H) -> Self {
        Self::new(host, host, host, host, host, host, host)
    }

    pub fn world(&self) -> &'a dyn WorldOracle {
        self.world
    }

    pub fn npcs(&self) -> &'a dyn NpcOracle {
        self.npcs
    }

    pub fn reach(&self) -> &'a dyn ReachOracle {
        self.reach
    }

    pub fn paths(&self) -> &'a dyn PathOracle {
        self.paths
    }

    pub fn interaction(&self) -> &'a dyn InteractionOracle {
        self.interaction
    }

    pub fn dialogue(&self) -> &'a dyn DialogueOracle {
        self.dialogue
    }

    pub fn clock(&self) -> &'a dyn ClockOracle {
        self.clock
    }
}

impl std::fmt::Debug for TaskEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskEnv")
            .field("tick", &self.world.current_tick())
            .field("now_ms", &self.clock.now_ms())
            .finish_non_exhaustive()
    }
}
