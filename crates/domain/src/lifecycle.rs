//! The lifecycle transition table. Grounded on
//! `gateway::runtime::runs::RunStatus` (which only checks `is_terminal`)
//! generalized into an explicit allow-list function, since this system's
//! status set is richer and the Runner needs to reject illegal
//! transitions with a structured error rather than trust callers.

use crate::error::OrchestratorError;
use crate::run::{RunId, RunStatus};

/// True if moving from `from` to `to` is a legal single-step
/// transition. Terminal statuses never transition further. A
/// non-terminal status transitioning to itself is always allowed as a
/// no-op: the Runner clears a resolved requirement and sets `Running`
/// directly before invoking the engine, so the engine's own "transition
/// to Running" step finds the run already there.
pub fn is_allowed_transition(from: RunStatus, to: RunStatus) -> bool {
    use RunStatus::*;
    if from == to {
        return !from.is_terminal();
    }
    match (from, to) {
        (Pending, Running) => true,
        (Pending, Cancelled) => true,
        (Running, Suspended) => true,
        (Running, Cancelled) => true,
        (Running, Completed) => true,
        (Running, Failed) => true,
        (Running, MaxStepsExceeded) => true,
        (Suspended, Running) => true,
        (Suspended, Cancelled) => true,
        (MaxStepsExceeded, Running) => true,
        (MaxStepsExceeded, Cancelled) => true,
        _ => false,
    }
}

/// Validate and apply a transition, returning the structured error the
/// Runner surfaces when a caller or the engine attempts an illegal move.
pub fn transition(run_id: &RunId, from: RunStatus, to: RunStatus) -> Result<RunStatus, OrchestratorError> {
    if is_allowed_transition(from, to) {
        Ok(to)
    } else {
        Err(OrchestratorError::InvalidRunStateTransition {
            run_id: run_id.as_str().to_string(),
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
