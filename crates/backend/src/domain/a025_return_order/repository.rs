//! In-memory хранилище заказов продаж и возвратных заказов

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use contracts::domain::a025_return_order::aggregate::{OrderHead, OrderLine};
use contracts::domain::a025_return_order::dto::ShippingInfo;
use tokio::sync::RwLock;

/// Заказ продажи, из которого оформляется возврат
#[derive(Debug, Clone, PartialEq)]
pub struct SalesOrder {
    pub head: OrderHead,
    pub lines: Vec<OrderLine>,
    /// По заказу уже выпущена кредит-нота
    pub cn_created: bool,
}

/// Зарегистрированный возвратный заказ
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnOrderRecord {
    pub head: OrderHead,
    pub shipping: ShippingInfo,
    pub items: Vec<OrderLine>,
    pub is_cn_created: bool,
    /// Номер SR менялся после генерации
    pub is_edited: bool,
    pub confirmed_by: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Store {
    sales_orders: HashMap<String, SalesOrder>,
    returns: HashMap<String, ReturnOrderRecord>,
    reference_seq: u64,
}

#[derive(Default)]
pub struct ReturnOrderRepository {
    store: RwLock<Store>,
}

impl ReturnOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_sales_order(&self, order: SalesOrder) {
        let mut store = self.store.write().await;
        store
            .sales_orders
            .insert(order.head.order_no.clone(), order);
    }

    /// Поиск по номеру заказа, иначе по номеру SO
    pub async fn find_sales_order(
        &self,
        order_no: Option<&str>,
        so_no: Option<&str>,
    ) -> Option<SalesOrder> {
        let store = self.store.read().await;
        if let Some(order_no) = order_no {
            return store.sales_orders.get(order_no).cloned();
        }
        let so_no = so_no?;
        store
            .sales_orders
            .values()
            .find(|o| o.head.so_no == so_no)
            .cloned()
    }

    pub async fn get_return(&self, order_no: &str) -> Option<ReturnOrderRecord> {
        self.store.read().await.returns.get(order_no).cloned()
    }

    /// Вставка нового возврата; `false`, если возврат по заказу уже есть
    pub async fn insert_return(&self, record: ReturnOrderRecord) -> bool {
        let mut store = self.store.write().await;
        if store.returns.contains_key(&record.head.order_no) {
            return false;
        }
        store.returns.insert(record.head.order_no.clone(), record);
        true
    }

    /// Изменяет возврат под блокировкой записи. `None`, если возврата нет.
    pub async fn update_return<R>(
        &self,
        order_no: &str,
        f: impl FnOnce(&mut ReturnOrderRecord) -> R,
    ) -> Option<R> {
        let mut store = self.store.write().await;
        store.returns.get_mut(order_no).map(f)
    }

    /// Следующий порядковый номер SR, начиная с 1
    pub async fn next_reference_seq(&self) -> u64 {
        let mut store = self.store.write().await;
        store.reference_seq += 1;
        store.reference_seq
    }

    #[cfg(test)]
    pub async fn count_returns(&self) -> usize {
        self.store.read().await.returns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::domain::a025_return_order::aggregate::ReturnChannel;

    fn head(order_no: &str, so_no: &str) -> OrderHead {
        OrderHead {
            order_no: order_no.into(),
            so_no: so_no.into(),
            reference_no: None,
            sales_status: "Invoiced".into(),
            marketplace_status: String::new(),
            channel: ReturnChannel::Trade,
            location_to: "Return".into(),
            return_status_id: None,
            confirm_status_id: None,
        }
    }

    fn record(order_no: &str) -> ReturnOrderRecord {
        ReturnOrderRecord {
            head: head(order_no, "SO-1"),
            shipping: ShippingInfo {
                return_date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
                warehouse_code: "WH01".into(),
                tracking_no: None,
                note: None,
            },
            items: vec![],
            is_cn_created: false,
            is_edited: false,
            confirmed_by: None,
            confirmed_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_sales_order_by_either_number() {
        let repo = ReturnOrderRepository::new();
        repo.upsert_sales_order(SalesOrder {
            head: head("ORD-1", "SO-1"),
            lines: vec![],
            cn_created: false,
        })
        .await;

        assert!(repo.find_sales_order(Some("ORD-1"), None).await.is_some());
        assert!(repo.find_sales_order(None, Some("SO-1")).await.is_some());
        assert!(repo.find_sales_order(Some("ORD-2"), Some("SO-1")).await.is_none());
        assert!(repo.find_sales_order(None, None).await.is_none());
    }

    #[tokio::test]
    async fn test_return_is_inserted_once() {
        let repo = ReturnOrderRepository::new();
        assert!(repo.insert_return(record("ORD-1")).await);
        assert!(!repo.insert_return(record("ORD-1")).await);
        assert_eq!(repo.count_returns().await, 1);
    }

    #[tokio::test]
    async fn test_update_return() {
        let repo = ReturnOrderRepository::new();
        repo.insert_return(record("ORD-1")).await;

        let updated = repo
            .update_return("ORD-1", |r| {
                r.is_edited = true;
                r.head.order_no.clone()
            })
            .await;
        assert_eq!(updated.as_deref(), Some("ORD-1"));
        assert!(repo.get_return("ORD-1").await.unwrap().is_edited);
        assert_eq!(repo.update_return("missing", |_| ()).await, None);
    }

    #[tokio::test]
    async fn test_reference_seq_increments() {
        let repo = ReturnOrderRepository::new();
        assert_eq!(repo.next_reference_seq().await, 1);
        assert_eq!(repo.next_reference_seq().await, 2);
    }
}
