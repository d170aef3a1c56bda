//! Workflow state: the single return order in flight and the step it is on

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use contracts::domain::a025_return_order::aggregate::{self, OrderHead, OrderLine};
use contracts::domain::a025_return_order::status::StatusPair;
use uuid::Uuid;

/// Workflow steps, in their fixed order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    #[default]
    Search,
    Create,
    Sr,
    Preview,
    Confirm,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Search,
        Step::Create,
        Step::Sr,
        Step::Preview,
        Step::Confirm,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Step> {
        Step::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Step> {
        self.index().checked_sub(1).map(|i| Step::ALL[i])
    }

    pub fn code(self) -> &'static str {
        match self {
            Step::Search => "search",
            Step::Create => "create",
            Step::Sr => "sr",
            Step::Preview => "preview",
            Step::Confirm => "confirm",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Search => "Поиск заказа",
            Step::Create => "Создание возврата",
            Step::Sr => "Номер SR",
            Step::Preview => "Проверка",
            Step::Confirm => "Подтверждение",
        }
    }
}

/// Backend operations that change the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Search,
    Create,
    GenerateReference,
    UpdateReference,
    Confirm,
}

/// The one request currently awaiting a response.
/// Responses carrying a different token are stale and get discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub token: Uuid,
    pub operation: Operation,
    pub order_no: Option<String>,
}

/// Return order as registered by the backend on create
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnOrder {
    pub order_no: String,
    pub is_cn_created: bool,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub status: StatusPair,
    pub confirmed_by: String,
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowState {
    pub current_step: Step,
    pub order_head: Option<OrderHead>,
    pub order_lines: Vec<OrderLine>,
    pub return_order: Option<ReturnOrder>,
    /// Credit note already exists for this order (reported by backend on create)
    pub is_cn_created: bool,
    /// Order was amended after creation
    pub is_edited: bool,
    pub confirmation: Option<Confirmation>,
    pub loading: bool,
    pub error: Option<String>,
    pub in_flight: Option<PendingRequest>,
}

impl WorkflowState {
    pub fn order_no(&self) -> Option<&str> {
        self.order_head.as_ref().map(|h| h.order_no.as_str())
    }

    pub fn reference_no(&self) -> Option<&str> {
        self.order_head
            .as_ref()
            .and_then(|h| h.reference_no.as_deref())
    }

    pub fn is_created(&self) -> bool {
        self.return_order.is_some()
    }

    /// Confirmed and sitting on the last step; only a reset leaves this state
    pub fn is_terminal(&self) -> bool {
        self.current_step == Step::Confirm && self.confirmation.is_some()
    }

    /// Return quantities are editable only on the create step, before creation
    pub fn lines_editable(&self) -> bool {
        self.current_step == Step::Create && !self.is_created() && !self.loading
    }

    pub fn selected_return_qty(&self) -> HashMap<String, i32> {
        self.order_lines
            .iter()
            .map(|l| (l.sku.clone(), l.return_qty))
            .collect()
    }

    pub fn total_return_qty(&self) -> i32 {
        aggregate::total_return_qty(&self.order_lines)
    }

    pub fn total_return_amount(&self) -> f64 {
        aggregate::total_return_amount(&self.order_lines)
    }

    pub(crate) fn owns(&self, token: Uuid) -> bool {
        self.in_flight.as_ref().map(|r| r.token) == Some(token)
    }
}
