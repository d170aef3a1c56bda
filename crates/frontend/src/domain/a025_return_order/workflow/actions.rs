//! Workflow actions and the reducer that applies them.
//!
//! The reducer is the only place `WorkflowState` changes. It never talks to
//! the backend; the controller dispatches actions around each request.

use std::collections::HashMap;

use contracts::domain::a025_return_order::dto::{
    CreateReturnResponse, SearchResult, UpdateStatusResponse,
};
use contracts::domain::a025_return_order::status::StatusPair;
use uuid::Uuid;

use super::state::{Confirmation, PendingRequest, ReturnOrder, Step, WorkflowState};

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowAction {
    RequestStarted(PendingRequest),
    SearchSucceeded {
        token: Uuid,
        result: SearchResult,
    },
    CreateSucceeded {
        token: Uuid,
        response: CreateReturnResponse,
        selection: HashMap<String, i32>,
    },
    ReferenceGenerated {
        token: Uuid,
        reference_no: String,
    },
    ReferenceUpdated {
        token: Uuid,
        reference_no: String,
    },
    Confirmed {
        token: Uuid,
        status: StatusPair,
        response: UpdateStatusResponse,
    },
    RequestFailed {
        token: Uuid,
        message: String,
    },
    /// Client-side rejection, no request involved
    ErrorRaised(String),
    ErrorCleared,
    ReturnQtyChanged {
        sku: String,
        qty: i32,
    },
    StepChanged(Step),
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOutcome {
    Applied,
    /// Response for a request that is no longer in flight (cancelled or superseded)
    Stale,
    /// Action not valid for the current state, nothing changed
    Ignored,
}

impl ReduceOutcome {
    pub fn is_applied(self) -> bool {
        self == ReduceOutcome::Applied
    }
}

pub fn reduce(state: &mut WorkflowState, action: WorkflowAction) -> ReduceOutcome {
    match action {
        WorkflowAction::RequestStarted(request) => {
            if state.in_flight.is_some() {
                return ReduceOutcome::Ignored;
            }
            state.loading = true;
            state.error = None;
            state.in_flight = Some(request);
            ReduceOutcome::Applied
        }

        WorkflowAction::SearchSucceeded { token, result } => {
            if !state.owns(token) {
                return ReduceOutcome::Stale;
            }
            finish(state);
            state.order_head = Some(result.head);
            state.order_lines = result
                .lines
                .into_iter()
                .map(|line| line.normalized())
                .collect();
            state.return_order = None;
            state.is_cn_created = false;
            state.is_edited = false;
            state.confirmation = None;
            ReduceOutcome::Applied
        }

        WorkflowAction::CreateSucceeded {
            token,
            response,
            selection,
        } => {
            if !state.owns(token) {
                return ReduceOutcome::Stale;
            }
            finish(state);
            for line in state.order_lines.iter_mut() {
                let qty = selection.get(&line.sku).copied().unwrap_or(0);
                line.set_return_qty(qty);
            }
            if let Some(head) = state.order_head.as_mut() {
                head.order_no = response.order_no.clone();
            }
            state.is_cn_created = response.is_cn_created;
            state.return_order = Some(ReturnOrder {
                order_no: response.order_no,
                is_cn_created: response.is_cn_created,
                items: response
                    .items
                    .into_iter()
                    .map(|line| line.normalized())
                    .collect(),
            });
            ReduceOutcome::Applied
        }

        WorkflowAction::ReferenceGenerated {
            token,
            reference_no,
        } => {
            if !state.owns(token) {
                return ReduceOutcome::Stale;
            }
            finish(state);
            if let Some(head) = state.order_head.as_mut() {
                head.reference_no = Some(reference_no);
            }
            ReduceOutcome::Applied
        }

        WorkflowAction::ReferenceUpdated {
            token,
            reference_no,
        } => {
            if !state.owns(token) {
                return ReduceOutcome::Stale;
            }
            finish(state);
            if let Some(head) = state.order_head.as_mut() {
                head.reference_no = Some(reference_no);
            }
            state.is_edited = true;
            ReduceOutcome::Applied
        }

        WorkflowAction::Confirmed {
            token,
            status,
            response,
        } => {
            if !state.owns(token) {
                return ReduceOutcome::Stale;
            }
            finish(state);
            if let Some(head) = state.order_head.as_mut() {
                head.return_status_id = Some(status.return_status.id());
                head.confirm_status_id = Some(status.confirm_status.id());
            }
            state.confirmation = Some(Confirmation {
                status,
                confirmed_by: response.confirmed_by,
                confirmed_at: response.confirmed_at,
            });
            ReduceOutcome::Applied
        }

        WorkflowAction::RequestFailed { token, message } => {
            if !state.owns(token) {
                return ReduceOutcome::Stale;
            }
            finish(state);
            state.error = Some(message);
            ReduceOutcome::Applied
        }

        WorkflowAction::ErrorRaised(message) => {
            state.error = Some(message);
            ReduceOutcome::Applied
        }

        WorkflowAction::ErrorCleared => {
            state.error = None;
            ReduceOutcome::Applied
        }

        WorkflowAction::ReturnQtyChanged { sku, qty } => {
            if !state.lines_editable() {
                return ReduceOutcome::Ignored;
            }
            match state.order_lines.iter_mut().find(|l| l.sku == sku) {
                Some(line) => {
                    line.set_return_qty(qty);
                    ReduceOutcome::Applied
                }
                None => ReduceOutcome::Ignored,
            }
        }

        // Landing on search always discards the order
        WorkflowAction::StepChanged(Step::Search) | WorkflowAction::Reset => {
            *state = WorkflowState::default();
            ReduceOutcome::Applied
        }

        WorkflowAction::StepChanged(step) => {
            state.current_step = step;
            state.error = None;
            ReduceOutcome::Applied
        }
    }
}

fn finish(state: &mut WorkflowState) {
    state.loading = false;
    state.in_flight = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a025_return_order::workflow::state::Operation;
    use contracts::domain::a025_return_order::aggregate::{OrderHead, OrderLine, ReturnChannel};

    fn head() -> OrderHead {
        OrderHead {
            order_no: "ORD-1001".into(),
            so_no: "SO-5001".into(),
            reference_no: None,
            sales_status: "Invoiced".into(),
            marketplace_status: "Delivered".into(),
            channel: ReturnChannel::Marketplace,
            location_to: "Return".into(),
            return_status_id: None,
            confirm_status_id: None,
        }
    }

    fn line(sku: &str, qty: i32) -> OrderLine {
        OrderLine {
            sku: sku.into(),
            item_name: format!("Item {}", sku),
            qty,
            return_qty: 0,
            price: -100.0,
        }
    }

    fn start(state: &mut WorkflowState, operation: Operation) -> Uuid {
        let token = Uuid::new_v4();
        let outcome = reduce(
            state,
            WorkflowAction::RequestStarted(PendingRequest {
                token,
                operation,
                order_no: state.order_no().map(str::to_string),
            }),
        );
        assert_eq!(outcome, ReduceOutcome::Applied);
        token
    }

    fn searched() -> WorkflowState {
        let mut state = WorkflowState::default();
        let token = start(&mut state, Operation::Search);
        reduce(
            &mut state,
            WorkflowAction::SearchSucceeded {
                token,
                result: SearchResult {
                    head: head(),
                    lines: vec![line("A", -5), line("B", 2)],
                },
            },
        );
        state
    }

    #[test]
    fn test_request_sets_loading_and_clears_error() {
        let mut state = WorkflowState {
            error: Some("old".into()),
            ..Default::default()
        };
        start(&mut state, Operation::Search);
        assert!(state.loading);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_second_request_is_ignored_while_in_flight() {
        let mut state = WorkflowState::default();
        let first = start(&mut state, Operation::Search);
        let outcome = reduce(
            &mut state,
            WorkflowAction::RequestStarted(PendingRequest {
                token: Uuid::new_v4(),
                operation: Operation::Search,
                order_no: None,
            }),
        );
        assert_eq!(outcome, ReduceOutcome::Ignored);
        assert!(state.owns(first));
    }

    #[test]
    fn test_search_success_normalizes_lines() {
        let state = searched();
        assert!(!state.loading);
        assert_eq!(state.order_no(), Some("ORD-1001"));
        assert_eq!(state.order_lines[0].qty, 5);
        assert_eq!(state.order_lines[0].price, 100.0);
        assert_eq!(state.in_flight, None);
    }

    #[test]
    fn test_failure_only_touches_error_and_loading() {
        let mut state = searched();
        let before = state.clone();
        let token = start(&mut state, Operation::Create);
        reduce(
            &mut state,
            WorkflowAction::RequestFailed {
                token,
                message: "Network error: offline".into(),
            },
        );
        assert_eq!(state.error.as_deref(), Some("Network error: offline"));
        assert!(!state.loading);
        state.error = None;
        assert_eq!(state, before);
    }

    #[test]
    fn test_stale_response_is_discarded_after_reset() {
        let mut state = searched();
        let token = start(&mut state, Operation::Search);
        reduce(&mut state, WorkflowAction::Reset);
        let outcome = reduce(
            &mut state,
            WorkflowAction::SearchSucceeded {
                token,
                result: SearchResult {
                    head: head(),
                    lines: vec![],
                },
            },
        );
        assert_eq!(outcome, ReduceOutcome::Stale);
        assert_eq!(state, WorkflowState::default());
    }

    #[test]
    fn test_return_qty_only_editable_on_create_step() {
        let mut state = searched();
        let outcome = reduce(
            &mut state,
            WorkflowAction::ReturnQtyChanged {
                sku: "A".into(),
                qty: 3,
            },
        );
        assert_eq!(outcome, ReduceOutcome::Ignored);

        reduce(&mut state, WorkflowAction::StepChanged(Step::Create));
        reduce(
            &mut state,
            WorkflowAction::ReturnQtyChanged {
                sku: "A".into(),
                qty: 30,
            },
        );
        assert_eq!(state.order_lines[0].return_qty, 5);
    }

    #[test]
    fn test_create_success_stores_order_and_cn_flag() {
        let mut state = searched();
        reduce(&mut state, WorkflowAction::StepChanged(Step::Create));
        let token = start(&mut state, Operation::Create);
        let selection = HashMap::from([("A".to_string(), 3), ("B".to_string(), 0)]);
        reduce(
            &mut state,
            WorkflowAction::CreateSucceeded {
                token,
                response: CreateReturnResponse {
                    order_no: "ORD-1001".into(),
                    is_cn_created: true,
                    items: vec![line("A", 5)],
                },
                selection,
            },
        );
        assert!(state.is_cn_created);
        assert!(state.is_created());
        assert_eq!(state.total_return_qty(), 3);
        assert!(!state.lines_editable());
    }

    #[test]
    fn test_reference_update_marks_order_edited() {
        let mut state = searched();
        let token = start(&mut state, Operation::GenerateReference);
        reduce(
            &mut state,
            WorkflowAction::ReferenceGenerated {
                token,
                reference_no: "SR-1".into(),
            },
        );
        assert_eq!(state.reference_no(), Some("SR-1"));
        assert!(!state.is_edited);

        let token = start(&mut state, Operation::UpdateReference);
        reduce(
            &mut state,
            WorkflowAction::ReferenceUpdated {
                token,
                reference_no: "SR-2".into(),
            },
        );
        assert_eq!(state.reference_no(), Some("SR-2"));
        assert!(state.is_edited);
    }

    #[test]
    fn test_back_to_search_clears_everything() {
        let mut state = searched();
        reduce(&mut state, WorkflowAction::StepChanged(Step::Create));
        reduce(
            &mut state,
            WorkflowAction::ReturnQtyChanged {
                sku: "B".into(),
                qty: 1,
            },
        );
        reduce(&mut state, WorkflowAction::StepChanged(Step::Search));
        assert_eq!(state, WorkflowState::default());
    }
}
