use std::cmp::Ordering;
use std::fmt;

use crate::env::{PathResult, TaskEnv, TravelerProfile};
use crate::state::{Point3D, Tick, WorldPoint};

/// Travel cost reported by the path service.
///
/// `Unreachable` is the sentinel maximum: it orders after every cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathDistance {
    Cost(u32),
    Unreachable,
}

impl PathDistance {
    /// Numeric view with `Unreachable` mapped to `u32::MAX`.
    pub const fn as_cost(self) -> u32 {
        match self {
            PathDistance::Cost(cost) => cost,
            PathDistance::Unreachable => u32::MAX,
        }
    }

    pub const fn is_reachable(self) -> bool {
        matches!(self, PathDistance::Cost(_))
    }
}

impl From<PathResult> for PathDistance {
    fn from(result: PathResult) -> Self {
        if result.is_success() {
            PathDistance::Cost(result.cost)
        } else {
            PathDistance::Unreachable
        }
    }
}

impl Ord for PathDistance {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PathDistance::Cost(a), PathDistance::Cost(b)) => a.cmp(b),
            (PathDistance::Cost(_), PathDistance::Unreachable) => Ordering::Less,
            (PathDistance::Unreachable, PathDistance::Cost(_)) => Ordering::Greater,
            (PathDistance::Unreachable, PathDistance::Unreachable) => Ordering::Equal,
        }
    }
}

impl PartialOrd for PathDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PathDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathDistance::Cost(cost) => write!(f, "{cost}"),
            PathDistance::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// Tick-keyed memo of one path distance.
///
/// A value computed at tick `t` is served for every query at ticks
/// `<= t + freshness`. Unreachable results are cached like any other so a
/// failing lookup is not repeated inside the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DistanceCache {
    freshness_ticks: u64,
    entry: Option<(Tick, PathDistance)>,
}

impl DistanceCache {
    pub const fn new(freshness_ticks: u64) -> Self {
        Self {
            freshness_ticks,
            entry: None,
        }
    }

    /// Cached value if still fresh at `now`.
    pub fn peek(&self, now: Tick) -> Option<PathDistance> {
        self.entry
            .filter(|(computed_at, _)| now <= *computed_at + self.freshness_ticks)
            .map(|(_, distance)| distance)
    }

    /// Tick of the last computation, if any.
    pub fn computed_at(&self) -> Option<Tick> {
        self.entry.map(|(tick, _)| tick)
    }

    pub fn get_or_compute(
        &mut self,
        now: Tick,
        compute: impl FnOnce() -> PathDistance,
    ) -> PathDistance {
        if let Some(distance) = self.peek(now) {
            return distance;
        }
        let distance = compute();
        self.entry = Some((now, distance));
        distance
    }

    /// Player-to-`destination` distance through the path oracle, memoized.
    pub fn query(&mut self, env: &TaskEnv<'_>, destination: WorldPoint) -> PathDistance {
        let world = env.world();
        let now = world.current_tick();
        self.get_or_compute(now, || {
            let from = Point3D::from(world.player_location());
            let to = Point3D::from(destination);
            let traveler = TravelerProfile::generate(world);
            let distance = PathDistance::from(env.paths().path(from, to, &traveler));
            tracing::trace!(
                target: "quest::task",
                %destination,
                %distance,
                tick = now.0,
                "Computed path distance"
            );
            distance
        })
    }
}
