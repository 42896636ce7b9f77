use crate::state::Point3D;

use super::WorldOracle;

/// Long-range pathfinding service (usually remote).
///
/// Each call is expensive; callers are expected to memoize results, see
/// [`crate::task::DistanceCache`].
pub trait PathOracle: Send + Sync {
    fn path(&self, from: Point3D, to: Point3D, traveler: &TravelerProfile) -> PathResult;
}

/// Outcome classification of a path request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathStatus {
    Success,
    Failure,
}

/// Path request result. `cost` is only meaningful on success.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    pub status: PathStatus,
    pub cost: u32,
}

impl PathResult {
    pub const fn success(cost: u32) -> Self {
        Self {
            status: PathStatus::Success,
            cost,
        }
    }

    pub const fn failure() -> Self {
        Self {
            status: PathStatus::Failure,
            cost: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PathStatus::Success
    }
}

/// Snapshot of the traveler sent along with path requests so the service can
/// account for movement mode and current plane.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TravelerProfile {
    pub run_enabled: bool,
    pub plane: i32,
}

impl TravelerProfile {
    pub fn generate(world: &dyn WorldOracle) -> Self {
        Self {
            run_enabled: world.is_run_enabled(),
            plane: world.player_location().plane,
        }
    }
}
