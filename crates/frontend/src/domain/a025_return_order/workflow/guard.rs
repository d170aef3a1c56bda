//! Step transition guard.
//!
//! Blacklist of unsafe forward jumps rather than a full transition table:
//! only the later steps carry strict checks, every other pair is allowed.

use super::state::{Step, WorkflowState};

pub fn can_transition(from: Step, to: Step, state: &WorkflowState) -> bool {
    match to {
        Step::Create => state.order_head.is_some(),
        Step::Sr => state.order_head.is_some() && state.return_order.is_some(),
        Step::Preview => from == Step::Sr && state.reference_no().is_some(),
        Step::Confirm => from == Step::Preview && state.reference_no().is_some(),
        Step::Search => true,
    }
}

/// "Back" is enabled: not busy, not terminal, and the guard allows the previous step
pub fn can_go_back(state: &WorkflowState) -> bool {
    if state.loading || state.is_terminal() {
        return false;
    }
    state
        .current_step
        .previous()
        .is_some_and(|prev| can_transition(state.current_step, prev, state))
}

/// "Next" is enabled for plain navigation. Steps that need a backend call
/// (search -> create, create -> sr before creation, preview -> confirm) go through
/// their own controller operations instead.
pub fn can_go_next(state: &WorkflowState) -> bool {
    if state.loading {
        return false;
    }
    match state.current_step.next() {
        Some(Step::Confirm) | None => false,
        Some(next) => can_transition(state.current_step, next, state),
    }
}
