use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Общий конверт ответов API: `{success, message?, data}`.
///
/// `success = false`: доменная ошибка, даже если HTTP статус 200.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("{0}")]
    Domain(String),
    #[error("Response envelope has no data")]
    MissingData,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn into_result(self) -> Result<T, EnvelopeError> {
        if !self.success {
            return Err(EnvelopeError::Domain(
                self.message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Operation failed".to_string()),
            ));
        }
        self.data.ok_or(EnvelopeError::MissingData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_false_is_domain_error_even_with_data() {
        let json = r#"{"success":false,"message":"Order is locked","data":"SR-1"}"#;
        let resp: ApiResponse<String> = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.into_result(),
            Err(EnvelopeError::Domain("Order is locked".into()))
        );
    }

    #[test]
    fn test_missing_message_gets_default() {
        let resp: ApiResponse<String> = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(
            resp.into_result(),
            Err(EnvelopeError::Domain("Operation failed".into()))
        );
    }

    #[test]
    fn test_success_without_data() {
        let resp: ApiResponse<String> =
            serde_json::from_str(r#"{"success":true,"data":null}"#).unwrap();
        assert_eq!(resp.into_result(), Err(EnvelopeError::MissingData));
    }

    #[test]
    fn test_ok_round_trip() {
        let json = serde_json::to_string(&ApiResponse::ok("SR-20260101-000001")).unwrap();
        let resp: ApiResponse<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(resp.into_result().unwrap(), "SR-20260101-000001");
    }
}
