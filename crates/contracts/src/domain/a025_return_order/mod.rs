//! A025 Return Order: возвратный заказ (маркетплейс, трейд, "слепой" возврат)

pub mod aggregate;
pub mod dto;
pub mod status;
