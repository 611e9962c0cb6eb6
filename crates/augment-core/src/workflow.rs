//! Workflow state machine
//!
//! `Idle → Validating → Classifying → (Confirming) → Stripping → Applying → Done`
//!
//! Every run keeps a [`WorkflowTrace`] of the states it visited. Transitions
//! are checked against [`allowed_transitions`]; an illegal one is logged and
//! rejected (and panics with the `strict-debug` feature).

use crate::error::TransitionError;

/// Workflow states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowState {
    /// Not started
    Idle,
    /// Checking actor, catalyst and item
    Validating,
    /// Deciding whether the current augment is protected
    Classifying,
    /// Waiting for the actor's answer, lock released
    Confirming,
    /// Removing the current augment
    Stripping,
    /// Running the refine transaction
    Applying,
    /// Terminal
    Done,
}

impl WorkflowState {
    /// Stable name for logs and errors
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Classifying => "classifying",
            Self::Confirming => "confirming",
            Self::Stripping => "stripping",
            Self::Applying => "applying",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Validates a state transition
pub fn validate_transition(from: WorkflowState, to: WorkflowState) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        #[cfg(feature = "strict-debug")]
        panic!("Illegal workflow transition attempted: {from} -> {to}");

        #[cfg(not(feature = "strict-debug"))]
        Err(TransitionError {
            from: from.name(),
            to: to.name(),
        })
    }
}

/// States reachable from `from`
#[must_use]
pub fn allowed_transitions(from: WorkflowState) -> Vec<WorkflowState> {
    use WorkflowState::{Applying, Classifying, Confirming, Done, Idle, Stripping, Validating};
    match from {
        Idle => vec![Validating],
        Validating => vec![Classifying, Done],
        Classifying => vec![Confirming, Stripping, Done],
        Confirming => vec![Stripping, Done],
        Stripping => vec![Applying],
        Applying => vec![Done],
        Done => vec![],
    }
}

/// States visited by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowTrace {
    states: Vec<WorkflowState>,
}

impl WorkflowTrace {
    /// Fresh trace at `Idle`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: vec![WorkflowState::Idle],
        }
    }

    /// Trace for a continuation resuming at `Confirming`
    #[inline]
    #[must_use]
    pub fn resumed() -> Self {
        Self {
            states: vec![WorkflowState::Confirming],
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn current(&self) -> WorkflowState {
        self.states
            .last()
            .copied()
            .unwrap_or(WorkflowState::Idle)
    }

    /// Move to `next`
    ///
    /// # Errors
    /// Returns `TransitionError` and stays put if the move is illegal
    pub fn enter(&mut self, next: WorkflowState) -> Result<(), TransitionError> {
        validate_transition(self.current(), next)?;
        self.states.push(next);
        Ok(())
    }

    /// Visited states in order
    #[inline]
    #[must_use]
    pub fn states(&self) -> &[WorkflowState] {
        &self.states
    }

    /// Whether the run visited `state`
    #[inline]
    #[must_use]
    pub fn visited(&self, state: WorkflowState) -> bool {
        self.states.contains(&state)
    }
}

impl Default for WorkflowTrace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use WorkflowState::*;

    #[test]
    fn happy_path_is_legal() {
        let mut trace = WorkflowTrace::new();
        for state in [Validating, Classifying, Stripping, Applying, Done] {
            trace.enter(state).unwrap();
        }
        assert_eq!(trace.current(), Done);
        assert!(!trace.visited(Confirming));
    }

    #[test]
    fn confirming_path_is_legal() {
        let mut trace = WorkflowTrace::new();
        for state in [Validating, Classifying, Confirming] {
            trace.enter(state).unwrap();
        }
        let mut resumed = WorkflowTrace::resumed();
        resumed.enter(Stripping).unwrap();
        resumed.enter(Applying).unwrap();
        resumed.enter(Done).unwrap();
        assert_eq!(resumed.states().len(), 4);
    }

    #[test]
    fn skipping_strip_is_illegal() {
        let mut trace = WorkflowTrace::new();
        trace.enter(Validating).unwrap();
        trace.enter(Classifying).unwrap();
        assert!(trace.enter(Applying).is_err());
        assert_eq!(trace.current(), Classifying);
    }

    #[test]
    fn done_is_terminal() {
        assert!(allowed_transitions(Done).is_empty());
    }

    proptest! {
        #[test]
        fn prop_validation_matches_table(
            from in prop_oneof![
                Just(Idle), Just(Validating), Just(Classifying), Just(Confirming),
                Just(Stripping), Just(Applying), Just(Done),
            ],
            to in prop_oneof![
                Just(Idle), Just(Validating), Just(Classifying), Just(Confirming),
                Just(Stripping), Just(Applying), Just(Done),
            ]
        ) {
            let res = validate_transition(from, to);
            let allowed = allowed_transitions(from);
            prop_assert_eq!(res.is_ok(), allowed.contains(&to));
        }
    }
}
