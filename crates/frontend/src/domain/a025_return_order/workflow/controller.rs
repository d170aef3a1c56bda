//! Workflow controller: turns user actions into backend calls and store actions.
//!
//! All methods take `&self`; state lives in a `RefCell` and is never borrowed
//! across an `.await`. The in-flight token is checked and set in one synchronous
//! dispatch, so a second side-effecting call cannot start while one is pending.

use std::cell::RefCell;
use std::collections::HashMap;

use contracts::domain::a025_return_order::aggregate::OrderLine;
use contracts::domain::a025_return_order::dto::{
    CreateReturnRequest, SearchQuery, UpdateStatusRequest,
};
use contracts::domain::a025_return_order::status::StatusRules;
use contracts::system::auth::Role;
use uuid::Uuid;

use super::actions::{reduce, ReduceOutcome, WorkflowAction};
use super::error::WorkflowError;
use super::form::ReturnForm;
use super::guard::can_transition;
use super::state::{Operation, PendingRequest, Step, WorkflowState};
use crate::domain::a025_return_order::api::ReturnOrderApi;

type Listener = Box<dyn Fn(&WorkflowState)>;

pub struct WorkflowController<A> {
    api: A,
    rules: StatusRules,
    state: RefCell<WorkflowState>,
    listeners: RefCell<Vec<Listener>>,
}

impl<A: ReturnOrderApi> WorkflowController<A> {
    pub fn new(api: A) -> Self {
        Self::with_rules(api, StatusRules::default())
    }

    pub fn with_rules(api: A, rules: StatusRules) -> Self {
        Self {
            api,
            rules,
            state: RefCell::new(WorkflowState::default()),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn rules(&self) -> &StatusRules {
        &self.rules
    }

    /// Snapshot of the current state
    pub fn state(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    /// Called with a fresh snapshot after every applied action
    pub fn subscribe(&self, listener: impl Fn(&WorkflowState) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub async fn do_search(&self, query: SearchQuery) -> Result<(), WorkflowError> {
        self.ensure_idle("search")?;

        let query = query.normalized();
        if query.is_empty() {
            return Err(self.reject(WorkflowError::validation(
                "enter a sales order or order number",
            )));
        }

        let (step, created) = self.with_state(|s| (s.current_step, s.is_created()));
        if !matches!(step, Step::Search | Step::Create) || created {
            return Err(self.reject(WorkflowError::TransitionDenied {
                from: step,
                to: Step::Create,
            }));
        }

        let token = self.begin(Operation::Search)?;
        log::debug!("search: {:?}", query);

        match self.api.search(&query).await {
            Ok(result) => {
                let order_no = result.head.order_no.clone();
                let lines = result.lines.len();
                if !self.apply_response("search", WorkflowAction::SearchSucceeded { token, result }) {
                    return Ok(());
                }
                log::info!("search: order {} loaded, {} lines", order_no, lines);
                self.advance(Step::Create)
            }
            Err(e) => Err(self.fail(token, e)),
        }
    }

    pub async fn do_create_return(
        &self,
        form: &ReturnForm,
        selection: &HashMap<String, i32>,
    ) -> Result<(), WorkflowError> {
        self.ensure_idle("create")?;

        let (step, head, lines, created) = self.with_state(|s| {
            (
                s.current_step,
                s.order_head.clone(),
                s.order_lines.clone(),
                s.is_created(),
            )
        });
        let head = match head {
            Some(head) if step == Step::Create => head,
            _ => {
                return Err(self.reject(WorkflowError::TransitionDenied {
                    from: step,
                    to: Step::Sr,
                }))
            }
        };
        if created {
            return Err(self.reject(WorkflowError::validation("return order already created")));
        }

        let items = selected_items(&lines, selection);
        if items.is_empty() {
            return Err(self.reject(WorkflowError::validation("no items selected")));
        }

        let shipping = form.normalize().map_err(|e| self.reject(e))?;

        let request = CreateReturnRequest {
            order_no: head.order_no.clone(),
            so_no: head.so_no.clone(),
            channel: head.channel,
            location_to: head.location_to.clone(),
            shipping,
            items,
        };

        let token = self.begin(Operation::Create)?;
        log::debug!(
            "create: order {} with {} items",
            request.order_no,
            request.items.len()
        );

        match self.api.create(&request).await {
            Ok(response) => {
                let order_no = response.order_no.clone();
                let is_cn_created = response.is_cn_created;
                let action = WorkflowAction::CreateSucceeded {
                    token,
                    response,
                    selection: selection.clone(),
                };
                if !self.apply_response("create", action) {
                    return Ok(());
                }
                log::info!(
                    "create: return order {} registered (credit note: {})",
                    order_no,
                    is_cn_created
                );
                self.advance(Step::Sr)
            }
            Err(e) => Err(self.fail(token, e)),
        }
    }

    /// Generates the SR number once. With a number already set this is a silent no-op.
    pub async fn do_generate_reference(&self) -> Result<(), WorkflowError> {
        if let Some(reference_no) = self.with_state(|s| s.reference_no().map(str::to_string)) {
            log::debug!("generate reference: already set to {}, skipping", reference_no);
            return Ok(());
        }
        self.ensure_idle("generate reference")?;

        let (step, order_no) = self.with_state(|s| {
            (
                s.current_step,
                s.return_order.as_ref().map(|o| o.order_no.clone()),
            )
        });
        let Some(order_no) = order_no else {
            return Err(self.reject(WorkflowError::validation(
                "return order is not created yet",
            )));
        };
        if step != Step::Sr {
            return Err(self.reject(WorkflowError::TransitionDenied {
                from: step,
                to: Step::Sr,
            }));
        }

        let token = self.begin(Operation::GenerateReference)?;
        log::debug!("generate reference: order {}", order_no);

        match self.api.generate_reference(&order_no).await {
            Ok(reference_no) => {
                let action = WorkflowAction::ReferenceGenerated {
                    token,
                    reference_no: reference_no.clone(),
                };
                if self.apply_response("generate reference", action) {
                    log::info!("generate reference: order {} -> {}", order_no, reference_no);
                }
                Ok(())
            }
            Err(e) => Err(self.fail(token, e)),
        }
    }

    /// Replaces an existing SR number. Counts as an amendment: sets `is_edited`.
    pub async fn do_update_reference(&self, reference_no: &str) -> Result<(), WorkflowError> {
        self.ensure_idle("update reference")?;

        let reference_no = reference_no.trim().to_string();
        let (step, order_no, current) = self.with_state(|s| {
            (
                s.current_step,
                s.order_no().map(str::to_string),
                s.reference_no().map(str::to_string),
            )
        });
        if !matches!(step, Step::Sr | Step::Preview) {
            return Err(self.reject(WorkflowError::TransitionDenied {
                from: step,
                to: Step::Sr,
            }));
        }
        let (Some(order_no), Some(current)) = (order_no, current) else {
            return Err(self.reject(WorkflowError::validation(
                "reference number is not generated yet",
            )));
        };
        if reference_no.is_empty() {
            return Err(self.reject(WorkflowError::validation("reference number is required")));
        }
        if reference_no == current {
            return Ok(());
        }

        let token = self.begin(Operation::UpdateReference)?;
        log::debug!("update reference: order {} {} -> {}", order_no, current, reference_no);

        match self.api.update_reference(&order_no, &reference_no).await {
            Ok(updated) => {
                let action = WorkflowAction::ReferenceUpdated {
                    token,
                    reference_no: updated,
                };
                if self.apply_response("update reference", action) {
                    log::info!("update reference: order {} marked as edited", order_no);
                }
                Ok(())
            }
            Err(e) => Err(self.fail(token, e)),
        }
    }

    /// Terminal step: computes the status pair for `role` and persists it
    pub async fn do_confirm(&self, role: Role, user_id: &str) -> Result<(), WorkflowError> {
        self.ensure_idle("confirm")?;

        let (step, allowed, is_cn_created, is_edited, order_no) = self.with_state(|s| {
            (
                s.current_step,
                can_transition(s.current_step, Step::Confirm, s),
                s.is_cn_created,
                s.is_edited,
                s.order_no().map(str::to_string),
            )
        });
        let order_no = match order_no {
            Some(order_no) if allowed => order_no,
            _ => {
                return Err(self.reject(WorkflowError::TransitionDenied {
                    from: step,
                    to: Step::Confirm,
                }))
            }
        };

        let status = self
            .rules
            .calculate(role, is_cn_created, is_edited)
            .map_err(|e| self.reject(e.into()))?;

        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(self.reject(WorkflowError::validation("user is not signed in")));
        }

        let request = UpdateStatusRequest {
            return_status_id: status.return_status.id(),
            confirm_status_id: status.confirm_status.id(),
            user_id: user_id.to_string(),
        };

        let token = self.begin(Operation::Confirm)?;
        log::debug!(
            "confirm: order {} as {:?}/{:?}",
            order_no,
            status.return_status,
            status.confirm_status
        );

        match self.api.update_status(&order_no, &request).await {
            Ok(response) => {
                let action = WorkflowAction::Confirmed {
                    token,
                    status,
                    response,
                };
                if !self.apply_response("confirm", action) {
                    return Ok(());
                }
                log::info!("confirm: order {} confirmed", order_no);
                self.advance(Step::Confirm)
            }
            Err(e) => Err(self.fail(token, e)),
        }
    }

    /// Drops the order without calling the backend. A response still in flight
    /// is discarded when it arrives.
    pub fn cancel(&self) {
        if let Some(pending) = self.with_state(|s| s.in_flight.clone()) {
            log::warn!("cancel: {:?} still in flight, its response will be discarded", pending.operation);
        }
        self.dispatch(WorkflowAction::Reset);
        log::info!("cancel: workflow reset");
    }

    pub fn go_back(&self) -> Result<(), WorkflowError> {
        self.ensure_idle("back")?;

        let (from, terminal) = self.with_state(|s| (s.current_step, s.is_terminal()));
        let Some(prev) = from.previous() else {
            return Ok(());
        };
        if terminal {
            return Err(self.reject(WorkflowError::TransitionDenied { from, to: prev }));
        }
        self.advance(prev)
    }

    /// Plain forward navigation between already-completed steps
    pub fn go_next(&self) -> Result<(), WorkflowError> {
        self.ensure_idle("next")?;

        let from = self.with_state(|s| s.current_step);
        match from.next() {
            Some(Step::Confirm) | None => Err(self.reject(WorkflowError::TransitionDenied {
                from,
                to: from.next().unwrap_or(from),
            })),
            Some(next) => self.advance(next),
        }
    }

    pub fn set_return_qty(&self, sku: &str, qty: i32) -> bool {
        self.dispatch(WorkflowAction::ReturnQtyChanged {
            sku: sku.to_string(),
            qty,
        })
        .is_applied()
    }

    pub fn clear_error(&self) {
        self.dispatch(WorkflowAction::ErrorCleared);
    }

    /// Shows a message raised outside the controller (e.g. a missing session)
    pub fn raise_error(&self, message: impl Into<String>) {
        self.dispatch(WorkflowAction::ErrorRaised(message.into()));
    }

    fn with_state<R>(&self, f: impl FnOnce(&WorkflowState) -> R) -> R {
        f(&self.state.borrow())
    }

    fn dispatch(&self, action: WorkflowAction) -> ReduceOutcome {
        let outcome = reduce(&mut self.state.borrow_mut(), action);
        if outcome.is_applied() {
            let snapshot = self.state();
            for listener in self.listeners.borrow().iter() {
                listener(&snapshot);
            }
        }
        outcome
    }

    fn ensure_idle(&self, op: &str) -> Result<(), WorkflowError> {
        if self.with_state(|s| s.loading || s.in_flight.is_some()) {
            log::warn!("{}: rejected, another request is in flight", op);
            return Err(WorkflowError::Busy);
        }
        Ok(())
    }

    fn begin(&self, operation: Operation) -> Result<Uuid, WorkflowError> {
        let token = Uuid::new_v4();
        let order_no = self.with_state(|s| s.order_no().map(str::to_string));
        let request = PendingRequest {
            token,
            operation,
            order_no,
        };
        match self.dispatch(WorkflowAction::RequestStarted(request)) {
            ReduceOutcome::Applied => Ok(token),
            _ => Err(WorkflowError::Busy),
        }
    }

    /// False when the response was stale and nothing was applied
    fn apply_response(&self, op: &str, action: WorkflowAction) -> bool {
        match self.dispatch(action) {
            ReduceOutcome::Applied => true,
            outcome => {
                log::warn!("{}: response discarded ({:?})", op, outcome);
                false
            }
        }
    }

    fn fail(&self, token: Uuid, err: WorkflowError) -> WorkflowError {
        log::warn!("request failed: {}", err);
        let outcome = self.dispatch(WorkflowAction::RequestFailed {
            token,
            message: err.to_string(),
        });
        if outcome == ReduceOutcome::Stale {
            log::warn!("failure belongs to a discarded request, state untouched");
        }
        err
    }

    fn reject(&self, err: WorkflowError) -> WorkflowError {
        log::warn!("rejected: {}", err);
        if !err.is_silent() {
            self.dispatch(WorkflowAction::ErrorRaised(err.to_string()));
        }
        err
    }

    fn advance(&self, to: Step) -> Result<(), WorkflowError> {
        let (from, allowed) =
            self.with_state(|s| (s.current_step, can_transition(s.current_step, to, s)));
        if !allowed {
            return Err(self.reject(WorkflowError::TransitionDenied { from, to }));
        }
        self.dispatch(WorkflowAction::StepChanged(to));
        Ok(())
    }
}

/// Lines with a positive return quantity, quantities taken from `selection` and clamped
fn selected_items(lines: &[OrderLine], selection: &HashMap<String, i32>) -> Vec<OrderLine> {
    lines
        .iter()
        .filter_map(|line| {
            let mut line = line.clone();
            line.set_return_qty(selection.get(&line.sku).copied().unwrap_or(0));
            line.is_selected().then_some(line)
        })
        .collect()
}
