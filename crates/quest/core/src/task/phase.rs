/// Where a task's execution step currently is.
///
/// A pending task walks `Locating` → (`Traveling` | `Interacting` →
/// `AwaitingArrival` → `AwaitingDialogue` → `ResolvingDialogue`) on every
/// pass and ends the pass either back in a pending phase or in one of the
/// terminal phases. The last phase reached stays observable for diagnostics.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TaskPhase {
    /// Resolving the target and a reachable tile next to it.
    #[default]
    Locating,
    /// Long-distance travel towards the declared location.
    Traveling,
    /// Issuing the interaction command.
    Interacting,
    /// Waiting for the player to reach the target.
    AwaitingArrival,
    /// Waiting for the conversation window.
    AwaitingDialogue,
    /// Selecting dialogue choices.
    ResolvingDialogue,
    Succeeded,
    Failed,
}

impl TaskPhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, TaskPhase::Succeeded | TaskPhase::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_render_snake_case() {
        assert_eq!(TaskPhase::AwaitingDialogue.to_string(), "awaiting_dialogue");
        assert_eq!(TaskPhase::Locating.as_ref(), "locating");
        assert!(TaskPhase::Failed.is_terminal());
        assert!(!TaskPhase::Traveling.is_terminal());
    }
}
