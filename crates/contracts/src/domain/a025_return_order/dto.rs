//! DTO запросов и ответов REST API возвратных заказов

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::{OrderHead, OrderLine, ReturnChannel};

/// GET /api/order/search?soNo=|orderNo=
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub so_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_no: Option<String>,
}

impl SearchQuery {
    pub fn by_order_no(order_no: impl Into<String>) -> Self {
        Self {
            so_no: None,
            order_no: Some(order_no.into()),
        }
    }

    pub fn by_so_no(so_no: impl Into<String>) -> Self {
        Self {
            so_no: Some(so_no.into()),
            order_no: None,
        }
    }

    /// Обрезает пробелы, пустые значения превращает в None
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            so_no: clean(self.so_no),
            order_no: clean(self.order_no),
        }
    }

    /// Ни один идентификатор не заполнен
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.so_no) && blank(&self.order_no)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub head: OrderHead,
    pub lines: Vec<OrderLine>,
}

/// Поля отгрузки, заполняемые на шаге создания
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub return_date: NaiveDate,
    pub warehouse_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// POST /api/order/create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReturnRequest {
    pub order_no: String,
    pub so_no: String,
    pub channel: ReturnChannel,
    pub location_to: String,
    #[serde(flatten)]
    pub shipping: ShippingInfo,
    /// Только строки с returnQty > 0
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReturnResponse {
    pub order_no: String,
    #[serde(rename = "isCNCreated")]
    pub is_cn_created: bool,
    pub items: Vec<OrderLine>,
}

/// POST /api/order/update-sr/{orderNo}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReferenceRequest {
    pub reference_no: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReferenceResponse {
    pub reference_no: String,
}

/// POST /api/order/update-status/{orderNo}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub return_status_id: i32,
    pub confirm_status_id: i32,
    #[serde(rename = "userID")]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusResponse {
    pub confirmed_by: String,
    pub confirmed_at: DateTime<Utc>,
}
