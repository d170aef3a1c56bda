use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use contracts::domain::a025_return_order::aggregate::{
    OrderHead, OrderLine, ReturnChannel, LOCATION_RETURN,
};
use contracts::domain::a025_return_order::dto::{
    CreateReturnRequest, CreateReturnResponse, SearchQuery, SearchResult, UpdateStatusRequest,
    UpdateStatusResponse,
};
use contracts::domain::a025_return_order::status::{ConfirmStatus, ReturnStatus};
use thiserror::Error;

use super::repository::{ReturnOrderRecord, ReturnOrderRepository, SalesOrder};
use crate::shared::config::Config;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
}

fn validation(message: impl Into<String>) -> ServiceError {
    ServiceError::Validation(message.into())
}

/// Номер SR: `{prefix}-{YYYYMMDD}-{seq:06}`
pub fn format_reference(prefix: &str, date: NaiveDate, seq: u64) -> String {
    format!("{}-{}-{:06}", prefix, date.format("%Y%m%d"), seq)
}

pub struct ReturnOrderService {
    repo: ReturnOrderRepository,
    reference_prefix: String,
}

impl ReturnOrderService {
    pub fn new(reference_prefix: impl Into<String>) -> Self {
        Self {
            repo: ReturnOrderRepository::new(),
            reference_prefix: reference_prefix.into(),
        }
    }

    pub async fn from_config(config: &Config) -> Self {
        let service = Self::new(config.reference.prefix.clone());
        if config.seed.demo_orders {
            service.seed_demo_orders().await;
        }
        service
    }

    #[cfg(test)]
    pub fn repository(&self) -> &ReturnOrderRepository {
        &self.repo
    }

    /// Заказ продажи по номеру заказа или SO. Если возврат уже оформлен,
    /// заголовок берётся из возврата (с SR и статусами).
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResult, ServiceError> {
        let query = query.normalized();
        if query.is_empty() {
            return Err(validation("soNo or orderNo is required"));
        }

        let order = self
            .repo
            .find_sales_order(query.order_no.as_deref(), query.so_no.as_deref())
            .await
            .ok_or_else(|| {
                ServiceError::NotFound(query.order_no.or(query.so_no).unwrap_or_default())
            })?;

        let head = match self.repo.get_return(&order.head.order_no).await {
            Some(existing) => existing.head,
            None => order.head,
        };
        Ok(SearchResult {
            head,
            lines: order.lines,
        })
    }

    pub async fn create(
        &self,
        request: CreateReturnRequest,
    ) -> Result<CreateReturnResponse, ServiceError> {
        let order = self
            .repo
            .find_sales_order(Some(&request.order_no), None)
            .await
            .ok_or_else(|| ServiceError::NotFound(request.order_no.clone()))?;

        if request.shipping.warehouse_code.trim().is_empty() {
            return Err(validation("warehouseCode is required"));
        }
        if request.items.is_empty() {
            return Err(validation("no items selected"));
        }

        let mut items = Vec::with_capacity(request.items.len());
        let mut seen = HashSet::new();
        for item in &request.items {
            if !seen.insert(item.sku.as_str()) {
                return Err(validation(format!("sku {} selected more than once", item.sku)));
            }
            let line = order
                .lines
                .iter()
                .find(|l| l.sku == item.sku)
                .ok_or_else(|| validation(format!("unknown sku {}", item.sku)))?;
            let line = line.clone().normalized();
            if item.return_qty <= 0 || item.return_qty > line.qty {
                return Err(validation(format!(
                    "returnQty for {} must be within 1..={}",
                    item.sku, line.qty
                )));
            }
            items.push(OrderLine {
                return_qty: item.return_qty,
                ..line
            });
        }

        let location_to = match request.location_to.trim() {
            "" => LOCATION_RETURN.to_string(),
            other => other.to_string(),
        };
        let record = ReturnOrderRecord {
            head: OrderHead {
                location_to,
                reference_no: None,
                return_status_id: None,
                confirm_status_id: None,
                ..order.head.clone()
            },
            shipping: request.shipping,
            items: items.clone(),
            is_cn_created: order.cn_created,
            is_edited: false,
            confirmed_by: None,
            confirmed_at: None,
        };

        if !self.repo.insert_return(record).await {
            return Err(ServiceError::Conflict(format!(
                "return order for {} already exists",
                request.order_no
            )));
        }
        tracing::info!(
            "return order {} created: {} items, credit note: {}",
            request.order_no,
            items.len(),
            order.cn_created
        );

        Ok(CreateReturnResponse {
            order_no: request.order_no,
            is_cn_created: order.cn_created,
            items,
        })
    }

    /// Выдаёт новый номер SR при каждом вызове
    pub async fn generate_reference(&self, order_no: &str) -> Result<String, ServiceError> {
        if self.repo.get_return(order_no).await.is_none() {
            return Err(ServiceError::NotFound(order_no.to_string()));
        }
        let seq = self.repo.next_reference_seq().await;
        let reference_no = format_reference(&self.reference_prefix, Utc::now().date_naive(), seq);

        self.repo
            .update_return(order_no, |r| r.head.reference_no = Some(reference_no.clone()))
            .await
            .ok_or_else(|| ServiceError::NotFound(order_no.to_string()))?;

        tracing::info!("return order {}: SR {} issued", order_no, reference_no);
        Ok(reference_no)
    }

    pub async fn update_reference(
        &self,
        order_no: &str,
        reference_no: &str,
    ) -> Result<String, ServiceError> {
        let reference_no = reference_no.trim().to_string();
        if reference_no.is_empty() {
            return Err(validation("referenceNo is required"));
        }

        self.repo
            .update_return(order_no, |r| {
                if r.head.reference_no.is_none() {
                    return Err(validation("reference number is not generated yet"));
                }
                r.head.reference_no = Some(reference_no.clone());
                r.is_edited = true;
                Ok(())
            })
            .await
            .ok_or_else(|| ServiceError::NotFound(order_no.to_string()))??;

        tracing::info!("return order {}: SR changed to {}", order_no, reference_no);
        Ok(reference_no)
    }

    pub async fn update_status(
        &self,
        order_no: &str,
        request: UpdateStatusRequest,
    ) -> Result<UpdateStatusResponse, ServiceError> {
        let return_status = ReturnStatus::from_id(request.return_status_id).ok_or_else(|| {
            validation(format!("unknown returnStatusId {}", request.return_status_id))
        })?;
        let confirm_status = ConfirmStatus::from_id(request.confirm_status_id).ok_or_else(|| {
            validation(format!("unknown confirmStatusId {}", request.confirm_status_id))
        })?;
        let user_id = request.user_id.trim().to_string();
        if user_id.is_empty() {
            return Err(validation("userID is required"));
        }

        let confirmed_at = Utc::now();
        let record = self
            .repo
            .update_return(order_no, |r| {
                if r.head.reference_no.is_none() {
                    return Err(validation("reference number is not generated yet"));
                }
                r.head.return_status_id = Some(return_status.id());
                r.head.confirm_status_id = Some(confirm_status.id());
                r.confirmed_by = Some(user_id.clone());
                r.confirmed_at = Some(confirmed_at);
                Ok(r.clone())
            })
            .await
            .ok_or_else(|| ServiceError::NotFound(order_no.to_string()))??;

        tracing::info!(
            "return order {} confirmed: {:?}/{:?}, {} items to {}, credit note: {}, edited: {}",
            order_no,
            return_status,
            confirm_status,
            record.items.len(),
            record.shipping.warehouse_code,
            record.is_cn_created,
            record.is_edited
        );
        Ok(UpdateStatusResponse {
            confirmed_by: record.confirmed_by.unwrap_or(user_id),
            confirmed_at: record.confirmed_at.unwrap_or(confirmed_at),
        })
    }

    /// Демо-заказы для локального запуска
    pub async fn seed_demo_orders(&self) {
        let line = |sku: &str, name: &str, qty: i32, price: f64| OrderLine {
            sku: sku.into(),
            item_name: name.into(),
            qty,
            return_qty: 0,
            price,
        };
        let head = |order_no: &str, so_no: &str, channel: ReturnChannel, mp_status: &str| OrderHead {
            order_no: order_no.into(),
            so_no: so_no.into(),
            reference_no: None,
            sales_status: "Invoiced".into(),
            marketplace_status: mp_status.into(),
            channel,
            location_to: LOCATION_RETURN.into(),
            return_status_id: None,
            confirm_status_id: None,
        };

        let orders = [
            SalesOrder {
                head: head("ORD-1001", "SO-5001", ReturnChannel::Marketplace, "Delivered"),
                lines: vec![
                    line("SKU-1001", "Кроссовки беговые", 5, 4990.0),
                    line("SKU-1002", "Носки спортивные", 2, 390.0),
                ],
                cn_created: false,
            },
            SalesOrder {
                head: head("ORD-1002", "SO-5002", ReturnChannel::Trade, ""),
                lines: vec![line("SKU-2001", "Рюкзак городской", 3, 2590.0)],
                cn_created: true,
            },
            // Строки из учётной системы приходят со знаком минус
            SalesOrder {
                head: head("ORD-1003", "SO-5003", ReturnChannel::Blind, ""),
                lines: vec![
                    line("SKU-3001", "Куртка зимняя", -1, -8990.0),
                    line("SKU-3002", "Шапка вязаная", -4, -690.0),
                ],
                cn_created: false,
            },
        ];

        let count = orders.len();
        for order in orders {
            self.repo.upsert_sales_order(order).await;
        }
        tracing::info!("seeded {} demo sales orders", count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a025_return_order::dto::ShippingInfo;
    use contracts::domain::a025_return_order::status::StatusPair;

    async fn service() -> ReturnOrderService {
        let service = ReturnOrderService::new("SR");
        service.seed_demo_orders().await;
        service
    }

    fn create_request(order_no: &str, items: Vec<(&str, i32)>) -> CreateReturnRequest {
        CreateReturnRequest {
            order_no: order_no.into(),
            so_no: String::new(),
            channel: ReturnChannel::Marketplace,
            location_to: LOCATION_RETURN.into(),
            shipping: ShippingInfo {
                return_date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
                warehouse_code: "WH01".into(),
                tracking_no: None,
                note: None,
            },
            items: items
                .into_iter()
                .map(|(sku, qty)| OrderLine {
                    sku: sku.into(),
                    item_name: String::new(),
                    qty: 0,
                    return_qty: qty,
                    price: 0.0,
                })
                .collect(),
        }
    }

    fn confirm_request(pair: StatusPair, user_id: &str) -> UpdateStatusRequest {
        UpdateStatusRequest {
            return_status_id: pair.return_status.id(),
            confirm_status_id: pair.confirm_status.id(),
            user_id: user_id.into(),
        }
    }

    #[test]
    fn test_format_reference() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(format_reference("SR", date, 42), "SR-20260105-000042");
    }

    #[tokio::test]
    async fn test_search_by_order_or_so() {
        let service = service().await;

        let by_order = service.search(SearchQuery::by_order_no(" ORD-1001 ")).await.unwrap();
        assert_eq!(by_order.head.so_no, "SO-5001");
        assert_eq!(by_order.lines.len(), 2);

        let by_so = service.search(SearchQuery::by_so_no("SO-5002")).await.unwrap();
        assert_eq!(by_so.head.order_no, "ORD-1002");

        assert_eq!(
            service.search(SearchQuery::by_order_no("ORD-9")).await,
            Err(ServiceError::NotFound("ORD-9".into()))
        );
        assert!(matches!(
            service.search(SearchQuery::default()).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_takes_cn_flag_from_sales_order() {
        let service = service().await;

        let response = service
            .create(create_request("ORD-1002", vec![("SKU-2001", 2)]))
            .await
            .unwrap();
        assert_eq!(response.order_no, "ORD-1002");
        assert!(response.is_cn_created);
        assert_eq!(response.items[0].return_qty, 2);
        assert_eq!(response.items[0].item_name, "Рюкзак городской");

        let response = service
            .create(create_request("ORD-1003", vec![("SKU-3002", 4)]))
            .await
            .unwrap();
        assert!(!response.is_cn_created);
        assert_eq!(response.items[0].price, 690.0);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_items_and_duplicates() {
        let service = service().await;

        assert!(matches!(
            service.create(create_request("ORD-1001", vec![])).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.create(create_request("ORD-1001", vec![("SKU-1001", 6)])).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.create(create_request("ORD-1001", vec![("NOPE", 1)])).await,
            Err(ServiceError::Validation(_))
        ));

        service
            .create(create_request("ORD-1001", vec![("SKU-1001", 1)]))
            .await
            .unwrap();
        assert!(matches!(
            service.create(create_request("ORD-1001", vec![("SKU-1001", 1)])).await,
            Err(ServiceError::Conflict(_))
        ));
        assert_eq!(service.repository().count_returns().await, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_repeated_sku() {
        let service = service().await;

        let repeated = create_request(
            "ORD-1001",
            vec![("SKU-1002", 2), ("SKU-1002", 2), ("SKU-1002", 2)],
        );
        assert!(matches!(
            service.create(repeated).await,
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(service.repository().count_returns().await, 0);

        let response = service
            .create(create_request("ORD-1001", vec![("SKU-1001", 5), ("SKU-1002", 2)]))
            .await
            .unwrap();
        let total: i32 = response.items.iter().map(|i| i.return_qty).sum();
        assert_eq!(total, 7);
        for item in &response.items {
            assert!(item.return_qty <= item.qty);
        }
    }

    #[tokio::test]
    async fn test_generate_reference_is_not_idempotent() {
        let service = service().await;
        service
            .create(create_request("ORD-1001", vec![("SKU-1001", 1)]))
            .await
            .unwrap();

        let first = service.generate_reference("ORD-1001").await.unwrap();
        let second = service.generate_reference("ORD-1001").await.unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("SR-"));
        assert!(first.ends_with("-000001"));

        let found = service.search(SearchQuery::by_order_no("ORD-1001")).await.unwrap();
        assert_eq!(found.head.reference_no, Some(second));

        assert_eq!(
            service.generate_reference("ORD-1002").await,
            Err(ServiceError::NotFound("ORD-1002".into()))
        );
    }

    #[tokio::test]
    async fn test_update_reference_marks_edited() {
        let service = service().await;
        service
            .create(create_request("ORD-1001", vec![("SKU-1001", 1)]))
            .await
            .unwrap();

        assert!(matches!(
            service.update_reference("ORD-1001", "SR-X").await,
            Err(ServiceError::Validation(_))
        ));

        service.generate_reference("ORD-1001").await.unwrap();
        let updated = service.update_reference("ORD-1001", " SR-MANUAL ").await.unwrap();
        assert_eq!(updated, "SR-MANUAL");

        let record = service.repository().get_return("ORD-1001").await.unwrap();
        assert!(record.is_edited);
        assert_eq!(record.head.reference_no.as_deref(), Some("SR-MANUAL"));
    }

    #[tokio::test]
    async fn test_update_status_stamps_confirmation() {
        let service = service().await;
        service
            .create(create_request("ORD-1001", vec![("SKU-1002", 2)]))
            .await
            .unwrap();

        let without_reference = service
            .update_status("ORD-1001", confirm_request(StatusPair::PENDING_DRAFT, "U1"))
            .await;
        assert!(matches!(without_reference, Err(ServiceError::Validation(_))));

        service.generate_reference("ORD-1001").await.unwrap();
        let response = service
            .update_status("ORD-1001", confirm_request(StatusPair::BOOKING_CONFIRMED, "U1"))
            .await
            .unwrap();
        assert_eq!(response.confirmed_by, "U1");

        let record = service.repository().get_return("ORD-1001").await.unwrap();
        assert_eq!(record.head.return_status_id, Some(ReturnStatus::Booking.id()));
        assert_eq!(record.head.confirm_status_id, Some(ConfirmStatus::Confirmed.id()));
        assert_eq!(record.confirmed_at, Some(response.confirmed_at));
    }

    #[tokio::test]
    async fn test_update_status_validates_ids_and_user() {
        let service = service().await;
        let bad_id = UpdateStatusRequest {
            return_status_id: 9,
            confirm_status_id: 1,
            user_id: "U1".into(),
        };
        assert!(matches!(
            service.update_status("ORD-1001", bad_id).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service
                .update_status("ORD-1001", confirm_request(StatusPair::PENDING_DRAFT, " "))
                .await,
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(
            service
                .update_status("ORD-1001", confirm_request(StatusPair::PENDING_DRAFT, "U1"))
                .await,
            Err(ServiceError::NotFound("ORD-1001".into()))
        );
    }
}
