use serde::{Deserialize, Serialize};

/// Склад-получатель возврата. В текущем контуре всегда "Return".
pub const LOCATION_RETURN: &str = "Return";

/// Канал продаж, из которого пришёл возврат
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnChannel {
    #[default]
    Marketplace,
    Trade,
    /// "Слепой" возврат: товар пришёл без известного канала продаж
    Blind,
}

impl ReturnChannel {
    pub fn code(&self) -> &'static str {
        match self {
            ReturnChannel::Marketplace => "marketplace",
            ReturnChannel::Trade => "trade",
            ReturnChannel::Blind => "blind",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            ReturnChannel::Marketplace => "Маркетплейс",
            ReturnChannel::Trade => "Трейд",
            ReturnChannel::Blind => "Неизвестный канал",
        }
    }
}

/// Заголовок возвратного заказа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHead {
    /// Номер заказа (присваивается бэкендом, после создания не меняется)
    pub order_no: String,
    /// Исходный заказ продажи
    pub so_no: String,
    /// Номер SR; пуст, пока не сгенерирован
    #[serde(default)]
    pub reference_no: Option<String>,
    #[serde(default)]
    pub sales_status: String,
    #[serde(default)]
    pub marketplace_status: String,
    #[serde(default)]
    pub channel: ReturnChannel,
    #[serde(default = "default_location")]
    pub location_to: String,
    #[serde(default)]
    pub return_status_id: Option<i32>,
    #[serde(default)]
    pub confirm_status_id: Option<i32>,
}

fn default_location() -> String {
    LOCATION_RETURN.to_string()
}

/// Строка возвратного заказа (SKU)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub sku: String,
    pub item_name: String,
    /// Исходное количество (всегда по модулю)
    pub qty: i32,
    /// Количество к возврату, 0..=qty
    #[serde(default)]
    pub return_qty: i32,
    /// Цена (всегда по модулю)
    pub price: f64,
}

impl OrderLine {
    /// Приводит количество и цену к модулю, ограничивает return_qty диапазоном 0..=qty.
    /// Учётная система отдаёт строки возвратов с отрицательными знаками.
    pub fn normalized(mut self) -> Self {
        self.qty = self.qty.saturating_abs();
        self.price = self.price.abs();
        self.return_qty = self.clamp_return_qty(self.return_qty);
        self
    }

    pub fn clamp_return_qty(&self, qty: i32) -> i32 {
        qty.clamp(0, self.qty.max(0))
    }

    pub fn set_return_qty(&mut self, qty: i32) {
        self.return_qty = self.clamp_return_qty(qty);
    }

    pub fn is_selected(&self) -> bool {
        self.return_qty > 0
    }

    /// Сумма к возврату по строке
    pub fn return_amount(&self) -> f64 {
        self.price * f64::from(self.return_qty)
    }
}

/// Общее количество к возврату по строкам
pub fn total_return_qty(lines: &[OrderLine]) -> i32 {
    lines.iter().map(|l| l.return_qty).sum()
}

/// Общая сумма к возврату по строкам
pub fn total_return_amount(lines: &[OrderLine]) -> f64 {
    lines.iter().map(OrderLine::return_amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(qty: i32, return_qty: i32, price: f64) -> OrderLine {
        OrderLine {
            sku: "SKU-1".into(),
            item_name: "Кроссовки".into(),
            qty,
            return_qty,
            price,
        }
    }

    #[test]
    fn test_normalized_takes_magnitude() {
        let l = line(-5, 0, -199.5).normalized();
        assert_eq!(l.qty, 5);
        assert_eq!(l.price, 199.5);
    }

    #[test]
    fn test_return_qty_is_clamped() {
        let mut l = line(5, 9, 10.0).normalized();
        assert_eq!(l.return_qty, 5);
        l.set_return_qty(-1);
        assert_eq!(l.return_qty, 0);
        l.set_return_qty(3);
        assert_eq!(l.return_qty, 3);
        assert!(l.is_selected());
    }

    #[test]
    fn test_totals() {
        let lines = vec![line(5, 3, 10.0), line(2, 0, 50.0), line(1, 1, 2.5)];
        assert_eq!(total_return_qty(&lines), 4);
        assert_eq!(total_return_amount(&lines), 32.5);
    }

    #[test]
    fn test_head_defaults_when_backend_omits_fields() {
        let json = r#"{"orderNo":"ORD-1001","soNo":"SO-1"}"#;
        let head: OrderHead = serde_json::from_str(json).unwrap();
        assert_eq!(head.location_to, LOCATION_RETURN);
        assert_eq!(head.reference_no, None);
        assert_eq!(head.channel, ReturnChannel::Marketplace);
    }
}
