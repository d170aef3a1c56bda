//! View model of the return workflow page.
//!
//! The controller is `!Send`, so it sits in a local `StoredValue`; the page
//! reads a mirrored `RwSignal<WorkflowState>` that the controller keeps current.

use std::rc::Rc;

use contracts::domain::a025_return_order::dto::SearchQuery;
use contracts::domain::a025_return_order::status::StatusPair;
use contracts::system::auth::SessionInfo;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::domain::a025_return_order::api::{HttpReturnOrderApi, ReturnOrderApi};
use crate::domain::a025_return_order::workflow::form::ReturnForm;
use crate::domain::a025_return_order::workflow::guard::{can_go_back, can_go_next};
use crate::domain::a025_return_order::workflow::{
    Step, WorkflowController, WorkflowError, WorkflowState,
};
use crate::shared::date_utils::today_iso;

pub struct ReturnWorkflowVm<A: 'static = HttpReturnOrderApi> {
    pub state: RwSignal<WorkflowState>,
    controller: StoredValue<Rc<WorkflowController<A>>, LocalStorage>,

    pub so_no: RwSignal<String>,
    pub order_no: RwSignal<String>,
    pub form: RwSignal<ReturnForm>,
    pub reference_input: RwSignal<String>,
}

impl<A> Clone for ReturnWorkflowVm<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for ReturnWorkflowVm<A> {}

impl ReturnWorkflowVm {
    pub fn new() -> Self {
        Self::with_api(HttpReturnOrderApi::new())
    }
}

impl<A: ReturnOrderApi + 'static> ReturnWorkflowVm<A> {
    pub fn with_api(api: A) -> Self {
        let controller = Rc::new(WorkflowController::new(api));
        let state = RwSignal::new(controller.state());
        controller.subscribe(move |snapshot| state.set(snapshot.clone()));

        Self {
            state,
            controller: StoredValue::new_local(controller),
            so_no: RwSignal::new(String::new()),
            order_no: RwSignal::new(String::new()),
            form: RwSignal::new(Self::blank_form()),
            reference_input: RwSignal::new(String::new()),
        }
    }

    fn blank_form() -> ReturnForm {
        ReturnForm {
            return_date: today_iso(),
            ..Default::default()
        }
    }

    fn controller(&self) -> Rc<WorkflowController<A>> {
        self.controller.get_value()
    }

    pub fn loading(&self) -> bool {
        self.state.with(|s| s.loading)
    }

    pub fn can_go_back(&self) -> bool {
        self.state.with(can_go_back)
    }

    pub fn can_go_next(&self) -> bool {
        self.state.with(can_go_next)
    }

    /// Status pair the current role would get on confirm, `None` if the role may not confirm
    pub fn expected_status(&self, session: &SessionInfo) -> Option<StatusPair> {
        let role = session.role()?;
        let (cn, edited) = self.state.with(|s| (s.is_cn_created, s.is_edited));
        self.controller
            .with_value(|c| c.rules().calculate(role, cn, edited).ok())
    }

    pub fn search(&self) {
        let controller = self.controller();
        let query = SearchQuery {
            so_no: Some(self.so_no.get_untracked()),
            order_no: Some(self.order_no.get_untracked()),
        };
        spawn_local(async move {
            settle("search", controller.do_search(query).await);
        });
    }

    pub fn set_return_qty(&self, sku: &str, raw: &str) {
        let qty = raw.trim().parse::<i32>().unwrap_or(0);
        self.controller().set_return_qty(sku, qty);
    }

    pub fn create(&self) {
        let controller = self.controller();
        let form = self.form.get_untracked();
        let selection = self.state.with_untracked(|s| s.selected_return_qty());
        spawn_local(async move {
            settle(
                "create",
                controller.do_create_return(&form, &selection).await,
            );
        });
    }

    pub fn generate_reference(&self) {
        let controller = self.controller();
        let reference_input = self.reference_input;
        spawn_local(async move {
            settle("generate reference", controller.do_generate_reference().await);
            if let Some(reference_no) = controller.state().reference_no() {
                reference_input.set(reference_no.to_string());
            }
        });
    }

    pub fn update_reference(&self) {
        let controller = self.controller();
        let reference_no = self.reference_input.get_untracked();
        spawn_local(async move {
            settle(
                "update reference",
                controller.do_update_reference(&reference_no).await,
            );
        });
    }

    pub fn confirm(&self, session: SessionInfo) {
        let controller = self.controller();
        let Some(role) = session.role().filter(|_| session.is_authenticated) else {
            controller.raise_error("Нет активной сессии или роль не распознана");
            return;
        };
        spawn_local(async move {
            settle("confirm", controller.do_confirm(role, &session.user_id).await);
        });
    }

    /// Landing on search discards the typed inputs, same as cancel
    pub fn go_back(&self) {
        let from = self.state.with_untracked(|s| s.current_step);
        let result = self.controller().go_back();
        let to = self.state.with_untracked(|s| s.current_step);
        if from != Step::Search && to == Step::Search {
            self.reset_inputs();
        }
        settle("back", result);
    }

    pub fn go_next(&self) {
        settle("next", self.controller().go_next());
    }

    /// Discards the order and the typed inputs
    pub fn cancel(&self) {
        self.controller().cancel();
        self.reset_inputs();
    }

    fn reset_inputs(&self) {
        self.so_no.set(String::new());
        self.order_no.set(String::new());
        self.form.set(Self::blank_form());
        self.reference_input.set(String::new());
    }

    pub fn clear_error(&self) {
        self.controller().clear_error();
    }
}

/// Errors are already in the state; here they are only logged
fn settle(op: &str, result: Result<(), WorkflowError>) {
    if let Err(e) = result {
        log::debug!("{} finished with: {}", op, e);
    }
}
