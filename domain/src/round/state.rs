//! Voting round lifecycle
//!
//! ```text
//! NotStarted ──▶ Running ──▶ Terminated(decision | no decision)
//!      │
//!      └──────▶ Failed(ConfigError)
//! ```
//!
//! Terminal states are final; a round is never restarted.

use super::result::Decision;
use crate::core::error::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub enum RoundState {
    NotStarted,
    Running,
    Terminated(Decision),
    Failed(ConfigError),
}

impl RoundState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundState::NotStarted => "not_started",
            RoundState::Running => "running",
            RoundState::Terminated(Decision::Decided(_)) => "terminated_decision",
            RoundState::Terminated(Decision::NoDecision) => "terminated_no_decision",
            RoundState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RoundState::Terminated(_) | RoundState::Failed(_))
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: &RoundState) -> bool {
        matches!(
            (self, next),
            (RoundState::NotStarted, RoundState::Running)
                | (RoundState::NotStarted, RoundState::Failed(_))
                | (RoundState::Running, RoundState::Running)
                | (RoundState::Running, RoundState::Terminated(_))
        )
    }
}

impl std::fmt::Display for RoundState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        let started = RoundState::NotStarted;
        assert!(started.can_transition_to(&RoundState::Running));
        assert!(started.can_transition_to(&RoundState::Failed(ConfigError::NoWorkers)));
        assert!(RoundState::Running.can_transition_to(&RoundState::Running));
        assert!(
            RoundState::Running.can_transition_to(&RoundState::Terminated(Decision::NoDecision))
        );
    }

    #[test]
    fn test_no_failure_after_launch() {
        assert!(!RoundState::Running.can_transition_to(&RoundState::Failed(ConfigError::ZeroK)));
        assert!(!RoundState::NotStarted.can_transition_to(&RoundState::Terminated(
            Decision::NoDecision
        )));
    }

    #[test]
    fn test_terminal_states_are_final() {
        let done = RoundState::Terminated(Decision::decided("approve"));
        assert!(done.is_terminal());
        assert!(!done.can_transition_to(&RoundState::Running));
        assert!(!done.can_transition_to(&RoundState::NotStarted));

        let failed = RoundState::Failed(ConfigError::ZeroTimeout);
        assert!(failed.is_terminal());
        assert!(!failed.can_transition_to(&RoundState::Running));
    }

    #[test]
    fn test_display() {
        assert_eq!(RoundState::NotStarted.to_string(), "not_started");
        assert_eq!(
            RoundState::Terminated(Decision::NoDecision).to_string(),
            "terminated_no_decision"
        );
    }
}
