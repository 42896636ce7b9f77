//! Deterministic in-process world over a virtual clock.
//!
//! Time only moves when a caller sleeps. While time moves, the player walks
//! one tile per [`SimWorld::RUN_MS_PER_TILE`] (or [`SimWorld::WALK_MS_PER_TILE`])
//! towards its destination. Interacting with an NPC walks the player next to it
//! and opens the conversation a fixed delay after arrival.
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use quest_core::{
    ClockOracle, CounterId, DialogueOracle, InteractionOracle, NameFilter, Npc, NpcId, NpcOracle,
    PathOracle, PathResult, Point3D, ReachOracle, Tick, TravelerProfile, WorldOracle, WorldPoint,
};
use tracing::{debug, trace};

/// NPC placed in a [`SimWorld`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimNpc {
    pub name: String,
    pub location: WorldPoint,
    /// Delay between arrival and the conversation opening; `None` never opens.
    pub reply_delay_ms: Option<u64>,
    /// Choice lists that resolve the conversation.
    pub accepts: Vec<Vec<String>>,
    /// Counter deltas applied when a conversation resolves.
    pub effects: Vec<(CounterId, i32)>,
}

impl SimNpc {
    pub const DEFAULT_REPLY_DELAY_MS: u64 = 600;

    pub fn new(name: impl Into<String>, location: WorldPoint) -> Self {
        Self {
            name: name.into(),
            location,
            reply_delay_ms: Some(Self::DEFAULT_REPLY_DELAY_MS),
            accepts: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn accepting<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepts.push(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn reply_delay(mut self, delay_ms: u64) -> Self {
        self.reply_delay_ms = Some(delay_ms);
        self
    }

    /// The conversation window never opens.
    pub fn silent(mut self) -> Self {
        self.reply_delay_ms = None;
        self
    }

    pub fn with_effect(mut self, counter: CounterId, delta: i32) -> Self {
        self.effects.push((counter, delta));
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimInteraction {
    pub npc: String,
    pub verb: String,
}

/// Everything the simulator was asked to do, for assertions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimLog {
    pub path_queries: u32,
    pub walks: Vec<WorldPoint>,
    pub interactions: Vec<SimInteraction>,
    pub dialogues: Vec<Vec<String>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Conversation {
    /// Player is still walking to the NPC.
    Approaching { npc: usize },
    Opening { npc: usize, at_ms: u64 },
}

#[derive(Debug)]
struct SimState {
    now_ms: u64,
    player: WorldPoint,
    run_enabled: bool,
    destination: Option<WorldPoint>,
    tile_progress_ms: u64,
    view_radius: u32,
    local_radius: u32,
    paths_blocked: bool,
    npcs: Vec<SimNpc>,
    counters: BTreeMap<CounterId, i32>,
    conversation: Option<Conversation>,
    log: SimLog,
}

impl SimState {
    fn ms_per_tile(&self) -> u64 {
        if self.run_enabled {
            SimWorld::RUN_MS_PER_TILE
        } else {
            SimWorld::WALK_MS_PER_TILE
        }
    }

    fn advance(&mut self, ms: u64) {
        let mut remaining = ms;
        while remaining > 0 {
            let Some(destination) = self.destination else {
                self.now_ms += remaining;
                break;
            };
            let needed = self.ms_per_tile().saturating_sub(self.tile_progress_ms);
            if remaining < needed {
                self.tile_progress_ms += remaining;
                self.now_ms += remaining;
                break;
            }
            remaining -= needed;
            self.now_ms += needed;
            self.tile_progress_ms = 0;
            self.player = self.player.step_towards(destination);
            if self.player == destination {
                self.arrive();
            }
        }
    }

    fn arrive(&mut self) {
        self.destination = None;
        self.tile_progress_ms = 0;
        trace!(target: "runtime::sim", player = %self.player, now_ms = self.now_ms, "Arrived");
        if let Some(Conversation::Approaching { npc }) = self.conversation {
            self.conversation = self.open_after_delay(npc);
        }
    }

    fn open_after_delay(&self, npc: usize) -> Option<Conversation> {
        let delay = self.npcs.get(npc)?.reply_delay_ms?;
        Some(Conversation::Opening {
            npc,
            at_ms: self.now_ms + delay,
        })
    }

    fn set_destination(&mut self, destination: WorldPoint) {
        if destination == self.player {
            self.destination = None;
        } else {
            self.destination = Some(destination);
        }
        self.tile_progress_ms = 0;
    }

    fn open_conversation(&self) -> Option<usize> {
        match self.conversation {
            Some(Conversation::Opening { npc, at_ms }) if self.now_ms >= at_ms => Some(npc),
            _ => None,
        }
    }

    fn is_visible(&self, npc: &SimNpc) -> bool {
        self.player.distance_to(npc.location) <= self.view_radius
    }

    fn is_local(&self, point: WorldPoint) -> bool {
        self.player.distance_to(point) <= self.local_radius
    }
}

/// Simulated world implementing every oracle trait.
#[derive(Debug)]
pub struct SimWorld {
    state: Mutex<SimState>,
}

impl SimWorld {
    /// Duration of one world tick.
    pub const TICK_MS: u64 = 600;
    pub const RUN_MS_PER_TILE: u64 = 300;
    pub const WALK_MS_PER_TILE: u64 = 600;
    pub const DEFAULT_VIEW_RADIUS: u32 = 15;
    pub const DEFAULT_LOCAL_RADIUS: u32 = 15;

    pub fn new(player: WorldPoint) -> Self {
        Self {
            state: Mutex::new(SimState {
                now_ms: 0,
                player,
                run_enabled: true,
                destination: None,
                tile_progress_ms: 0,
                view_radius: Self::DEFAULT_VIEW_RADIUS,
                local_radius: Self::DEFAULT_LOCAL_RADIUS,
                paths_blocked: false,
                npcs: Vec::new(),
                counters: BTreeMap::new(),
                conversation: None,
                log: SimLog::default(),
            }),
        }
    }

    pub fn with_npc(self, npc: SimNpc) -> Self {
        self.lock().npcs.push(npc);
        self
    }

    pub fn with_counter(self, counter: CounterId, value: i32) -> Self {
        self.set_counter(counter, value);
        self
    }

    pub fn with_run_enabled(self, enabled: bool) -> Self {
        self.lock().run_enabled = enabled;
        self
    }

    /// Radius within which NPCs are loaded.
    pub fn with_view_radius(self, radius: u32) -> Self {
        self.lock().view_radius = radius;
        self
    }

    /// Radius the local pathfinder covers.
    pub fn with_local_radius(self, radius: u32) -> Self {
        self.lock().local_radius = radius;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_counter(&self, counter: CounterId, value: i32) {
        self.lock().counters.insert(counter, value);
    }

    /// Makes every remote path query fail.
    pub fn set_paths_blocked(&self, blocked: bool) {
        self.lock().paths_blocked = blocked;
    }

    pub fn player(&self) -> WorldPoint {
        self.lock().player
    }

    pub fn log(&self) -> SimLog {
        self.lock().log.clone()
    }

    /// Advances virtual time by whole world ticks.
    pub fn advance_ticks(&self, ticks: u64) {
        self.lock().advance(ticks.saturating_mul(Self::TICK_MS));
    }
}

impl WorldOracle for SimWorld {
    fn current_tick(&self) -> Tick {
        Tick(self.lock().now_ms / Self::TICK_MS)
    }

    fn player_location(&self) -> WorldPoint {
        self.lock().player
    }

    fn is_moving(&self) -> bool {
        self.lock().destination.is_some()
    }

    fn is_run_enabled(&self) -> bool {
        self.lock().run_enabled
    }

    fn counter(&self, id: CounterId) -> i32 {
        self.lock().counters.get(&id).copied().unwrap_or(0)
    }
}

impl NpcOracle for SimWorld {
    fn find_npc(&self, filter: &NameFilter) -> Option<Npc> {
        let state = self.lock();
        state
            .npcs
            .iter()
            .enumerate()
            .find(|(_, npc)| filter.matches(&npc.name) && state.is_visible(npc))
            .map(|(index, npc)| Npc::new(npc_id(index), npc.name.clone(), npc.location))
    }
}

impl ReachOracle for SimWorld {
    fn nearest_reachable_tile(&self, point: WorldPoint, radius: u32) -> Option<WorldPoint> {
        let state = self.lock();
        if !state.is_local(point) {
            return None;
        }
        if radius == 0 || state.player == point {
            Some(point)
        } else {
            Some(point.step_towards(state.player))
        }
    }

    fn travel_distance(&self, tile: WorldPoint) -> Option<u32> {
        let state = self.lock();
        state.is_local(tile).then(|| state.player.distance_to(tile))
    }
}

impl PathOracle for SimWorld {
    fn path(&self, from: Point3D, to: Point3D, _traveler: &TravelerProfile) -> PathResult {
        let mut state = self.lock();
        state.log.path_queries += 1;
        if state.paths_blocked || from.z != to.z {
            return PathResult::failure();
        }
        let from = WorldPoint::new(from.x, from.y, from.z);
        let to = WorldPoint::new(to.x, to.y, to.z);
        PathResult::success(from.distance_to(to))
    }
}

impl InteractionOracle for SimWorld {
    fn walk_to(&self, destination: WorldPoint) -> bool {
        let mut state = self.lock();
        state.log.walks.push(destination);
        if destination.plane != state.player.plane {
            debug!(target: "runtime::sim", %destination, "Walk rejected: other plane");
            return false;
        }
        state.conversation = None;
        state.set_destination(destination);
        true
    }

    fn interact(&self, npc: &Npc, verb: &str) -> bool {
        let mut state = self.lock();
        state.log.interactions.push(SimInteraction {
            npc: npc.name.clone(),
            verb: verb.to_string(),
        });

        let Some(index) = state
            .npcs
            .iter()
            .position(|candidate| candidate.name == npc.name && state.is_visible(candidate))
        else {
            debug!(target: "runtime::sim", npc = %npc.name, "Interaction rejected: target gone");
            return false;
        };

        let target = state.npcs[index].location;
        if state.player.distance_to(target) <= 1 {
            state.destination = None;
            state.conversation = state.open_after_delay(index);
        } else {
            let tile = target.step_towards(state.player);
            state.set_destination(tile);
            state.conversation = Some(Conversation::Approaching { npc: index });
        }
        true
    }
}

impl DialogueOracle for SimWorld {
    fn is_conversation_open(&self) -> bool {
        self.lock().open_conversation().is_some()
    }

    fn handle_in_order(&self, choices: &[String]) -> bool {
        let mut state = self.lock();
        state.log.dialogues.push(choices.to_vec());

        let Some(index) = state.open_conversation() else {
            return false;
        };
        state.conversation = None;

        let npc = &state.npcs[index];
        if !npc.accepts.iter().any(|accepted| accepted == choices) {
            debug!(target: "runtime::sim", npc = %npc.name, ?choices, "Dialogue choices rejected");
            return false;
        }

        let effects = npc.effects.clone();
        for (counter, delta) in effects {
            let value = state.counters.entry(counter).or_insert(0);
            *value = value.saturating_add(delta);
        }
        true
    }
}

impl ClockOracle for SimWorld {
    fn now_ms(&self) -> u64 {
        self.lock().now_ms
    }

    fn sleep_ms(&self, ms: u64) {
        self.lock().advance(ms);
    }
}

fn npc_id(index: usize) -> NpcId {
    NpcId(u32::try_from(index).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: WorldPoint = WorldPoint::new(3200, 3200, 0);

    fn choices(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn player_moves_while_time_passes() {
        let world = SimWorld::new(START);
        assert!(world.walk_to(WorldPoint::new(3210, 3200, 0)));
        assert!(world.is_moving());

        world.sleep_ms(SimWorld::RUN_MS_PER_TILE * 4 + 100);
        assert_eq!(world.player(), WorldPoint::new(3204, 3200, 0));

        world.sleep_ms(10_000);
        assert_eq!(world.player(), WorldPoint::new(3210, 3200, 0));
        assert!(!world.is_moving());
        assert_eq!(world.current_tick(), Tick((4 * 300 + 100 + 10_000) / 600));
    }

    #[test]
    fn walking_is_slower_than_running() {
        let world = SimWorld::new(START).with_run_enabled(false);
        world.walk_to(WorldPoint::new(3210, 3200, 0));
        world.sleep_ms(SimWorld::WALK_MS_PER_TILE * 2);
        assert_eq!(world.player(), WorldPoint::new(3202, 3200, 0));
    }

    #[test]
    fn npcs_are_only_visible_nearby() {
        let world =
            SimWorld::new(START).with_npc(SimNpc::new("My Arm", WorldPoint::new(3240, 3200, 0)));
        assert!(world.find_npc(&NameFilter::contains("my arm")).is_none());

        world.walk_to(WorldPoint::new(3230, 3200, 0));
        world.sleep_ms(60_000);
        let npc = world.find_npc(&NameFilter::contains("my arm"));
        assert_eq!(
            npc.map(|npc| npc.location),
            Some(WorldPoint::new(3240, 3200, 0))
        );
    }

    #[test]
    fn conversation_opens_after_arrival_and_delay() {
        let npc_at = WorldPoint::new(3205, 3200, 0);
        let world = SimWorld::new(START)
            .with_npc(SimNpc::new("My Arm", npc_at).reply_delay(500).accepting(["Yes"]));
        let npc = world.find_npc(&NameFilter::contains("My Arm")).unwrap();

        assert!(world.interact(&npc, "Talk-to"));
        // Four tiles to the adjacent tile at 300 ms each.
        world.sleep_ms(1200);
        assert_eq!(world.player(), WorldPoint::new(3204, 3200, 0));
        assert!(!world.is_conversation_open());

        world.sleep_ms(500);
        assert!(world.is_conversation_open());
        assert!(world.handle_in_order(&choices(&["Yes"])));
        assert!(!world.is_conversation_open());
    }

    #[test]
    fn silent_npc_never_opens() {
        let world = SimWorld::new(START)
            .with_npc(SimNpc::new("Mute", WorldPoint::new(3201, 3200, 0)).silent());
        let npc = world.find_npc(&NameFilter::contains("Mute")).unwrap();

        assert!(world.interact(&npc, "Talk-to"));
        world.sleep_ms(60_000);
        assert!(!world.is_conversation_open());
        assert!(!world.handle_in_order(&choices(&["Yes"])));
    }

    #[test]
    fn resolved_dialogue_applies_counter_effects() {
        let counter = CounterId(2792);
        let world = SimWorld::new(START).with_counter(counter, 2).with_npc(
            SimNpc::new("My Arm", WorldPoint::new(3201, 3200, 0))
                .reply_delay(0)
                .accepting(["Yes"])
                .with_effect(counter, 3),
        );
        let npc = world.find_npc(&NameFilter::contains("My Arm")).unwrap();

        world.interact(&npc, "Talk-to");
        assert!(world.handle_in_order(&choices(&["Yes"])));
        assert_eq!(world.counter(counter), 5);
    }

    #[test]
    fn records_queries_and_commands() {
        let world = SimWorld::new(START);
        let traveler = TravelerProfile::generate(&world);
        let origin = Point3D::new(0, 0, 0);
        let result = world.path(origin, Point3D::new(3, 4, 0), &traveler);
        assert_eq!(result, PathResult::success(4));
        let upstairs = world.path(origin, Point3D::new(0, 0, 1), &traveler);
        assert!(!upstairs.is_success());
        world.walk_to(WorldPoint::new(3201, 3201, 0));

        let log = world.log();
        assert_eq!(log.path_queries, 2);
        assert_eq!(log.walks, vec![WorldPoint::new(3201, 3201, 0)]);
    }

    #[test]
    fn reach_is_limited_to_local_region() {
        let world = SimWorld::new(START).with_local_radius(5);
        let near = WorldPoint::new(3204, 3200, 0);
        assert_eq!(
            world.nearest_reachable_tile(near, 1),
            Some(WorldPoint::new(3203, 3200, 0))
        );
        assert_eq!(world.travel_distance(near), Some(4));
        let far = WorldPoint::new(3220, 3200, 0);
        assert_eq!(world.nearest_reachable_tile(far, 1), None);
    }
}
