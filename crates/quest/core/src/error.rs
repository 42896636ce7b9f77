//! Failure taxonomy for task execution.
//!
//! Tasks never return errors to their caller. A [`TaskError`] is recorded on
//! the task instead: transient setbacks are kept as the last setback while the
//! task stays pending, fatal ones become the task's failure reason.

/// How a setback affects the task that hit it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Absorbed locally; the task retries on its next pass.
    ///
    /// Examples: target not loaded yet, conversation window late
    Transient,

    /// Terminal; the task transitions to failed.
    ///
    /// Examples: interaction rejected, attempt ceiling reached
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Which bounded counter a budget failure refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AttemptKind {
    Walk,
    Talk,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskError {
    #[error("target {target} is not loaded or has no reachable tile nearby")]
    TargetUnreachable { target: String },

    #[error("travel command towards {destination} was rejected")]
    WalkRejected { destination: String },

    #[error("conversation window did not open")]
    DialogueNotOpened,

    #[error("{kind} attempts exhausted (ceiling {ceiling})")]
    AttemptBudgetExceeded { kind: AttemptKind, ceiling: u32 },

    #[error("interaction `{verb}` with {target} was rejected")]
    CommandRejected { target: String, verb: String },

    #[error("dialogue could not be resolved{}", backup_suffix(.used_backup))]
    DialogueUnresolved { used_backup: bool },
}

impl TaskError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TaskError::TargetUnreachable { .. }
            | TaskError::WalkRejected { .. }
            | TaskError::DialogueNotOpened => ErrorSeverity::Transient,
            TaskError::AttemptBudgetExceeded { .. }
            | TaskError::CommandRejected { .. }
            | TaskError::DialogueUnresolved { .. } => ErrorSeverity::Fatal,
        }
    }

    /// Stable identifier for logs and reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            TaskError::TargetUnreachable { .. } => "target_unreachable",
            TaskError::WalkRejected { .. } => "walk_rejected",
            TaskError::DialogueNotOpened => "dialogue_not_opened",
            TaskError::AttemptBudgetExceeded { .. } => "attempt_budget_exceeded",
            TaskError::CommandRejected { .. } => "command_rejected",
            TaskError::DialogueUnresolved { .. } => "dialogue_unresolved",
        }
    }
}

fn backup_suffix(used_backup: &bool) -> &'static str {
    if *used_backup {
        " with primary or backup choices"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_splits_transient_from_fatal() {
        assert!(!TaskError::DialogueNotOpened.severity().is_fatal());
        assert!(
            TaskError::AttemptBudgetExceeded {
                kind: AttemptKind::Talk,
                ceiling: 5
            }
            .severity()
            .is_fatal()
        );
    }

    #[test]
    fn messages_name_the_cause() {
        let err = TaskError::AttemptBudgetExceeded {
            kind: AttemptKind::Walk,
            ceiling: 5,
        };
        assert_eq!(err.to_string(), "walk attempts exhausted (ceiling 5)");

        let err = TaskError::DialogueUnresolved { used_backup: true };
        assert_eq!(
            err.to_string(),
            "dialogue could not be resolved with primary or backup choices"
        );
        assert_eq!(
            TaskError::DialogueUnresolved { used_backup: false }.to_string(),
            "dialogue could not be resolved"
        );
    }
}
