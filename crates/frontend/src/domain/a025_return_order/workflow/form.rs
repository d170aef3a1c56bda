//! Raw form values of the create step and their normalization

use contracts::domain::a025_return_order::dto::ShippingInfo;

use super::error::WorkflowError;
use crate::shared::date_utils::parse_user_date;

/// Shipping fields exactly as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnForm {
    pub return_date: String,
    pub warehouse_code: String,
    pub tracking_no: String,
    pub note: String,
}

impl ReturnForm {
    /// Date to ISO, warehouse code trimmed and upper-cased, blank optionals dropped
    pub fn normalize(&self) -> Result<ShippingInfo, WorkflowError> {
        let return_date = parse_user_date(&self.return_date).ok_or_else(|| {
            WorkflowError::validation(format!("invalid return date '{}'", self.return_date.trim()))
        })?;

        let warehouse_code = self.warehouse_code.trim().to_uppercase();
        if warehouse_code.is_empty() {
            return Err(WorkflowError::validation("warehouse is required"));
        }

        Ok(ShippingInfo {
            return_date,
            warehouse_code,
            tracking_no: non_blank(&self.tracking_no),
            note: non_blank(&self.note),
        })
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_normalize() {
        let form = ReturnForm {
            return_date: "15.03.2024".into(),
            warehouse_code: " wh-01 ".into(),
            tracking_no: "  ".into(),
            note: " damaged box ".into(),
        };
        let shipping = form.normalize().unwrap();
        assert_eq!(shipping.return_date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(shipping.warehouse_code, "WH-01");
        assert_eq!(shipping.tracking_no, None);
        assert_eq!(shipping.note.as_deref(), Some("damaged box"));
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        let form = ReturnForm {
            return_date: "yesterday".into(),
            warehouse_code: "WH".into(),
            ..Default::default()
        };
        assert!(matches!(form.normalize(), Err(WorkflowError::Validation(_))));

        let form = ReturnForm {
            return_date: "2024-03-15".into(),
            ..Default::default()
        };
        assert_eq!(
            form.normalize(),
            Err(WorkflowError::validation("warehouse is required"))
        );
    }
}
