//! In-crate test doubles for the oracle traits.
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::env::{
    ClockOracle, DialogueOracle, InteractionOracle, NpcOracle, PathOracle, PathResult,
    ReachOracle, TravelerProfile, WorldOracle,
};
use crate::state::{CounterId, NameFilter, Npc, NpcId, Point3D, Tick, WorldPoint};

/// Clock whose time only moves when someone sleeps.
#[derive(Debug, Default)]
pub(crate) struct ManualClock {
    now: AtomicU64,
}

impl ClockOracle for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn sleep_ms(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

pub(crate) struct MockState {
    pub tick: Tick,
    pub player: WorldPoint,
    pub moving: bool,
    pub run_enabled: bool,
    pub npc: Option<Npc>,
    pub reachable: bool,
    pub travel_distance: u32,
    pub walk_accepted: bool,
    pub interact_results: VecDeque<bool>,
    pub conversation_opens: bool,
    pub accepted_choices: Vec<Vec<String>>,
    pub path_result: PathResult,
    pub counters: BTreeMap<CounterId, i32>,

    pub walks: Vec<WorldPoint>,
    pub interactions: Vec<String>,
    pub dialogues: Vec<Vec<String>>,
    pub path_queries: u32,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            tick: Tick::ZERO,
            player: WorldPoint::new(3200, 3200, 0),
            moving: false,
            run_enabled: true,
            npc: None,
            reachable: true,
            travel_distance: 1,
            walk_accepted: true,
            interact_results: VecDeque::new(),
            conversation_opens: true,
            accepted_choices: Vec::new(),
            path_result: PathResult::success(10),
            counters: BTreeMap::new(),
            walks: Vec::new(),
            interactions: Vec::new(),
            dialogues: Vec::new(),
            path_queries: 0,
        }
    }
}

/// Scriptable host backing every oracle.
#[derive(Default)]
pub(crate) struct MockHost {
    pub clock: ManualClock,
    state: Mutex<MockState>,
}

impl MockHost {
    pub fn new(configure: impl FnOnce(&mut MockState)) -> Self {
        let host = Self::default();
        host.with(configure);
        host
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    pub fn npc(name: &str, location: WorldPoint) -> Npc {
        Npc::new(NpcId(1), name, location)
    }
}

pub(crate) fn choices(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

impl WorldOracle for MockHost {
    fn current_tick(&self) -> Tick {
        self.with(|s| s.tick)
    }

    fn player_location(&self) -> WorldPoint {
        self.with(|s| s.player)
    }

    fn is_moving(&self) -> bool {
        self.with(|s| s.moving)
    }

    fn is_run_enabled(&self) -> bool {
        self.with(|s| s.run_enabled)
    }

    fn counter(&self, id: CounterId) -> i32 {
        self.with(|s| s.counters.get(&id).copied().unwrap_or(0))
    }
}

impl NpcOracle for MockHost {
    fn find_npc(&self, filter: &NameFilter) -> Option<Npc> {
        self.with(|s| s.npc.clone().filter(|npc| filter.matches(&npc.name)))
    }
}

impl ReachOracle for MockHost {
    fn nearest_reachable_tile(&self, point: WorldPoint, _radius: u32) -> Option<WorldPoint> {
        self.with(|s| s.reachable.then_some(point))
    }

    fn travel_distance(&self, _tile: WorldPoint) -> Option<u32> {
        self.with(|s| Some(s.travel_distance))
    }
}

impl PathOracle for MockHost {
    fn path(&self, _from: Point3D, _to: Point3D, _traveler: &TravelerProfile) -> PathResult {
        self.with(|s| {
            s.path_queries += 1;
            s.path_result
        })
    }
}

impl InteractionOracle for MockHost {
    fn walk_to(&self, destination: WorldPoint) -> bool {
        self.with(|s| {
            s.walks.push(destination);
            if s.walk_accepted {
                s.player = destination;
            }
            s.walk_accepted
        })
    }

    fn interact(&self, _npc: &Npc, verb: &str) -> bool {
        self.with(|s| {
            s.interactions.push(verb.to_string());
            s.interact_results.pop_front().unwrap_or(true)
        })
    }
}

impl DialogueOracle for MockHost {
    fn is_conversation_open(&self) -> bool {
        self.with(|s| s.conversation_opens)
    }

    fn handle_in_order(&self, choices: &[String]) -> bool {
        self.with(|s| {
            s.dialogues.push(choices.to_vec());
            s.accepted_choices.iter().any(|accepted| accepted == choices)
        })
    }
}

impl ClockOracle for MockHost {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn sleep_ms(&self, ms: u64) {
        self.clock.sleep_ms(ms);
    }
}
