#![forbid(unsafe_code)]

//! Pure progression arithmetic over an already-instantiated step sequence.
//! The store fetches the ordered steps inside its transaction and decides
//! the next position here, so the algorithm is testable without a database.

use crate::policy::PhaseClosePolicy;
use crate::state::StepState;

/// Smallest step order strictly greater than `current`. `None` means the
/// instance has no further eligible step and the caller must advance the
/// phase (which instantiates new steps).
pub fn next_step_order(eligible_orders: &[i64], current: i64) -> Option<i64> {
    eligible_orders
        .iter()
        .copied()
        .filter(|order| *order > current)
        .min()
}

/// Rounded percentage of completed steps, 0 when the instance is empty.
pub fn overall_progress(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (completed * 100 + total / 2) / total
}

/// Number of steps that keep the current phase open under `policy`.
pub fn phase_close_blockers(states: &[StepState], policy: PhaseClosePolicy) -> usize {
    states
        .iter()
        .filter(|state| match policy {
            PhaseClosePolicy::CompletedOnly => **state != StepState::Completed,
            PhaseClosePolicy::CompletedOrSkipped => {
                !matches!(**state, StepState::Completed | StepState::Skipped)
            }
        })
        .count()
}
