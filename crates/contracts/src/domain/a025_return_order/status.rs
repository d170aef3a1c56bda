//! Расчёт статусов возврата при подтверждении
//!
//! Статус возврата и статус подтверждения зависят от роли подтверждающего
//! и двух флагов заказа: создан ли кредит-нот (CN) и редактировался ли заказ
//! после создания. Таблица правил по ролям настраивается через [`StatusRules`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::system::auth::Role;

/// Статус возврата (сторона исполнения)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnStatus {
    Pending,
    Booking,
}

impl ReturnStatus {
    pub fn id(&self) -> i32 {
        match self {
            ReturnStatus::Pending => 1,
            ReturnStatus::Booking => 2,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(ReturnStatus::Pending),
            2 => Some(ReturnStatus::Booking),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ReturnStatus::Pending => "Ожидает",
            ReturnStatus::Booking => "Проведён",
        }
    }
}

/// Статус подтверждения (сторона учёта)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmStatus {
    Draft,
    Confirmed,
}

impl ConfirmStatus {
    pub fn id(&self) -> i32 {
        match self {
            ConfirmStatus::Draft => 1,
            ConfirmStatus::Confirmed => 2,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(ConfirmStatus::Draft),
            2 => Some(ConfirmStatus::Confirmed),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ConfirmStatus::Draft => "Черновик",
            ConfirmStatus::Confirmed => "Подтверждён",
        }
    }
}

/// Пара статусов, которая уходит в update-status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusPair {
    pub return_status: ReturnStatus,
    pub confirm_status: ConfirmStatus,
}

impl StatusPair {
    pub const PENDING_DRAFT: StatusPair = StatusPair {
        return_status: ReturnStatus::Pending,
        confirm_status: ConfirmStatus::Draft,
    };

    pub const BOOKING_CONFIRMED: StatusPair = StatusPair {
        return_status: ReturnStatus::Booking,
        confirm_status: ConfirmStatus::Confirmed,
    };
}

/// Правило подтверждения, закреплённое за ролью
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmRule {
    /// Проводим, только если кредит-нот уже создан (бухгалтерия)
    CreditNote,
    /// Проводим, только если заказ не правился после создания (склад)
    Unedited,
}

impl ConfirmRule {
    pub fn apply(&self, is_cn_created: bool, is_edited: bool) -> StatusPair {
        let book = match self {
            ConfirmRule::CreditNote => is_cn_created,
            ConfirmRule::Unedited => !is_edited,
        };
        if book {
            StatusPair::BOOKING_CONFIRMED
        } else {
            StatusPair::PENDING_DRAFT
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("Role '{}' is not allowed to confirm return orders", .0.display_name())]
    InvalidRole(Role),
}

/// Таблица правил "роль -> правило подтверждения".
///
/// По умолчанию подтверждать могут только бухгалтерия и склад. Остальные роли
/// получают [`StatusError::InvalidRole`], пока их явно не добавят через [`StatusRules::with_rule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRules {
    rules: HashMap<Role, ConfirmRule>,
}

impl Default for StatusRules {
    fn default() -> Self {
        let mut rules = HashMap::new();
        rules.insert(Role::Accounting, ConfirmRule::CreditNote);
        rules.insert(Role::Warehouse, ConfirmRule::Unedited);
        Self { rules }
    }
}

impl StatusRules {
    pub fn with_rule(mut self, role: Role, rule: ConfirmRule) -> Self {
        self.rules.insert(role, rule);
        self
    }

    pub fn rule_for(&self, role: Role) -> Option<ConfirmRule> {
        self.rules.get(&role).copied()
    }

    pub fn can_confirm(&self, role: Role) -> bool {
        self.rules.contains_key(&role)
    }

    pub fn calculate(
        &self,
        role: Role,
        is_cn_created: bool,
        is_edited: bool,
    ) -> Result<StatusPair, StatusError> {
        self.rule_for(role)
            .map(|rule| rule.apply(is_cn_created, is_edited))
            .ok_or(StatusError::InvalidRole(role))
    }
}

/// Расчёт по таблице правил по умолчанию
pub fn calculate_status(
    role: Role,
    is_cn_created: bool,
    is_edited: bool,
) -> Result<StatusPair, StatusError> {
    StatusRules::default().calculate(role, is_cn_created, is_edited)
}
