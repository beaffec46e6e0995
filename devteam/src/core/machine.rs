//! Per-item processing state and phase transitions.
//!
//! Pure bookkeeping: the orchestrator in [`crate::team`] drives the collaborators
//! and records each step here, which keeps the counter invariants in one place.

use anyhow::{Result, anyhow};

use crate::core::types::{Counters, Phase};

/// In-memory state for one processor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingState {
    phase: Phase,
    counters: Counters,
    current_requirement: Option<String>,
}

impl Default for ProcessingState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            counters: Counters::default(),
            current_requirement: None,
        }
    }
}

impl ProcessingState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn current_requirement(&self) -> Option<&str> {
        self.current_requirement.as_deref()
    }

    /// Leave `Idle`. An empty queue goes straight to `Terminated`.
    pub fn begin(&mut self, queue_empty: bool) -> Result<()> {
        self.expect_phase(&[Phase::Idle], "begin")?;
        self.phase = if queue_empty {
            Phase::Terminated
        } else {
            Phase::GatheringNext
        };
        Ok(())
    }

    /// Record a popped requirement: bump `story_count` and overwrite the slot.
    ///
    /// Returns the new story number.
    pub fn record_pop(&mut self, requirement: String) -> Result<u32> {
        self.expect_phase(&[Phase::GatheringNext], "record_pop")?;
        self.counters.story_count += 1;
        self.current_requirement = Some(requirement);
        self.phase = Phase::GeneratingCode;
        Ok(self.counters.story_count)
    }

    /// Replace the working requirement (used by the elaboration step).
    pub fn replace_requirement(&mut self, requirement: String) -> Result<()> {
        self.expect_phase(&[Phase::GeneratingCode], "replace_requirement")?;
        self.current_requirement = Some(requirement);
        Ok(())
    }

    pub fn record_code_saved(&mut self) -> Result<()> {
        self.expect_phase(&[Phase::GeneratingCode], "record_code_saved")?;
        self.phase = Phase::GeneratingTests;
        Ok(())
    }

    /// Record a completed test round and pick the next phase.
    pub fn record_tests_saved(&mut self, queue_empty: bool) -> Result<Phase> {
        self.expect_phase(&[Phase::GeneratingTests], "record_tests_saved")?;
        self.counters.testing_rounds += 1;
        self.phase = if queue_empty {
            Phase::Terminated
        } else {
            Phase::GatheringNext
        };
        Ok(self.phase)
    }

    /// Move to `Terminated` from any phase. Returns `false` if already there.
    pub fn terminate(&mut self) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.phase = Phase::Terminated;
        true
    }

    fn expect_phase(&self, allowed: &[Phase], op: &str) -> Result<()> {
        if allowed.contains(&self.phase) {
            return Ok(());
        }
        Err(anyhow!("{op} not allowed in phase {}", self.phase))
    }
}

/// Check the counter invariants against the number of popped items.
///
/// Returns a list of violations (empty when consistent).
pub fn validate_counters(counters: Counters, popped: u32) -> Vec<String> {
    let mut errors = Vec::new();
    if counters.story_count != popped {
        errors.push(format!(
            "story_count {} does not match popped items {popped}",
            counters.story_count
        ));
    }
    if counters.testing_rounds > counters.story_count {
        errors.push(format!(
            "testing_rounds {} exceeds story_count {}",
            counters.testing_rounds, counters.story_count
        ));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_queue_terminates_from_idle() {
        let mut state = ProcessingState::default();
        state.begin(true).expect("begin");
        assert_eq!(state.phase(), Phase::Terminated);
        assert_eq!(state.counters(), Counters::default());
    }

    #[test]
    fn full_cycle_updates_counters_in_order() {
        let mut state = ProcessingState::default();
        state.begin(false).expect("begin");
        assert_eq!(state.phase(), Phase::GatheringNext);

        let story = state.record_pop("first".to_string()).expect("pop");
        assert_eq!(story, 1);
        assert_eq!(state.current_requirement(), Some("first"));
        assert_eq!(state.counters().testing_rounds, 0);

        state.record_code_saved().expect("code");
        assert_eq!(state.phase(), Phase::GeneratingTests);

        let next = state.record_tests_saved(false).expect("tests");
        assert_eq!(next, Phase::GatheringNext);
        assert_eq!(
            state.counters(),
            Counters {
                story_count: 1,
                testing_rounds: 1
            }
        );

        state.record_pop("second".to_string()).expect("pop");
        assert_eq!(state.current_requirement(), Some("second"));
        state.record_code_saved().expect("code");
        assert_eq!(
            state.record_tests_saved(true).expect("tests"),
            Phase::Terminated
        );
        assert_eq!(state.counters().story_count, 2);
        assert_eq!(state.counters().testing_rounds, 2);
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let mut state = ProcessingState::default();
        let err = state.record_pop("x".to_string()).unwrap_err();
        assert!(err.to_string().contains("record_pop not allowed in phase idle"));

        state.begin(false).expect("begin");
        assert!(state.record_tests_saved(true).is_err());
        assert!(state.begin(false).is_err());
    }

    #[test]
    fn terminate_is_absorbing() {
        let mut state = ProcessingState::default();
        assert!(state.terminate());
        assert!(!state.terminate());
        assert!(state.begin(false).is_err());
    }

    #[test]
    fn validate_counters_reports_violations() {
        let ok = Counters {
            story_count: 2,
            testing_rounds: 1,
        };
        assert!(validate_counters(ok, 2).is_empty());

        let bad = Counters {
            story_count: 1,
            testing_rounds: 2,
        };
        let errors = validate_counters(bad, 3);
        assert!(errors.iter().any(|e| e.contains("does not match popped")));
        assert!(errors.iter().any(|e| e.contains("exceeds story_count")));
    }
}
