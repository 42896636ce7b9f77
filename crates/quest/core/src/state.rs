//! World value types shared by the oracles, tasks and hosts.
//!
//! These are plain snapshots: the core never owns live world state, it only
//! receives copies of it through the oracle traits in [`crate::env`].
use std::cmp::Ordering;
use std::fmt;

/// Discrete host world-update counter. The core's only notion of time for caching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_add(rhs))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tile in the world: horizontal coordinates plus the vertical plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPoint {
    pub x: i32,
    pub y: i32,
    pub plane: i32,
}

impl WorldPoint {
    pub const fn new(x: i32, y: i32, plane: i32) -> Self {
        Self { x, y, plane }
    }

    /// Chebyshev distance in tiles. Points on different planes are infinitely
    /// far apart, reported as `u32::MAX`.
    pub fn distance_to(self, other: WorldPoint) -> u32 {
        if self.plane != other.plane {
            return u32::MAX;
        }
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.max(dy)
    }

    /// Moves one tile towards `other` on each axis (diagonals allowed).
    pub fn step_towards(self, other: WorldPoint) -> WorldPoint {
        WorldPoint {
            x: step_axis(self.x, other.x),
            y: step_axis(self.y, other.y),
            plane: self.plane,
        }
    }
}

fn step_axis(from: i32, to: i32) -> i32 {
    match to.cmp(&from) {
        Ordering::Greater => from + 1,
        Ordering::Less => from - 1,
        Ordering::Equal => from,
    }
}

impl fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.plane)
    }
}

/// Point shape used by the pathfinding service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point3D {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl From<WorldPoint> for Point3D {
    fn from(point: WorldPoint) -> Self {
        Self::new(point.x, point.y, point.plane)
    }
}

/// Host identifier of a non-player character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NpcId(pub u32);

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A resolved interaction target, as seen at lookup time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Npc {
    pub id: NpcId,
    pub name: String,
    pub location: WorldPoint,
}

impl Npc {
    pub fn new(id: NpcId, name: impl Into<String>, location: WorldPoint) -> Self {
        Self {
            id,
            name: name.into(),
            location,
        }
    }
}

/// Name predicate used to pick a target out of the visible NPCs.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NameFilter {
    /// Case-insensitive substring match.
    Contains(String),
    /// Exact, case-sensitive match.
    Exact(String),
}

impl NameFilter {
    pub fn contains(needle: impl Into<String>) -> Self {
        Self::Contains(needle.into())
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameFilter::Contains(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
            NameFilter::Exact(expected) => name == expected,
        }
    }

    /// The text the filter was built from.
    pub fn pattern(&self) -> &str {
        match self {
            NameFilter::Contains(needle) | NameFilter::Exact(needle) => needle,
        }
    }
}

impl fmt::Display for NameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

/// Handle to a live integer counter in world state (quest progress varbits).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterId(pub u32);
