//! API layer for return orders
//!
//! One method per backend endpoint. Every failure comes back as a
//! [`WorkflowError`]; nothing here touches workflow state.

use async_trait::async_trait;
use contracts::domain::a025_return_order::dto::{
    CreateReturnRequest, CreateReturnResponse, SearchQuery, SearchResult, UpdateReferenceRequest,
    UpdateReferenceResponse, UpdateStatusRequest, UpdateStatusResponse,
};
use contracts::shared::api_response::ApiResponse;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;

use super::workflow::error::WorkflowError;
use crate::shared::api_utils::api_base;

#[async_trait(?Send)]
pub trait ReturnOrderApi {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, WorkflowError>;

    async fn create(
        &self,
        request: &CreateReturnRequest,
    ) -> Result<CreateReturnResponse, WorkflowError>;

    /// Not idempotent on the backend: every call issues a new number
    async fn generate_reference(&self, order_no: &str) -> Result<String, WorkflowError>;

    async fn update_reference(
        &self,
        order_no: &str,
        reference_no: &str,
    ) -> Result<String, WorkflowError>;

    async fn update_status(
        &self,
        order_no: &str,
        request: &UpdateStatusRequest,
    ) -> Result<UpdateStatusResponse, WorkflowError>;
}

/// Backend client over `gloo-net`
#[derive(Debug, Clone)]
pub struct HttpReturnOrderApi {
    base_url: String,
}

impl HttpReturnOrderApi {
    pub fn new() -> Self {
        Self::with_base_url(api_base())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/order{}", self.base_url, path)
    }
}

impl Default for HttpReturnOrderApi {
    fn default() -> Self {
        Self::new()
    }
}

fn network(e: gloo_net::Error) -> WorkflowError {
    WorkflowError::Network(e.to_string())
}

async fn unwrap_envelope<T: DeserializeOwned>(response: Response) -> Result<T, WorkflowError> {
    let status = response.status();
    let status_text = response.status_text();
    let body = response
        .text()
        .await
        .map_err(|e| WorkflowError::Server(format!("Failed to read response: {}", e)))?;
    decode_envelope(status, &status_text, &body)
}

/// Non-2xx and unparsable bodies are `Server`, `success: false` is `Domain`
fn decode_envelope<T: DeserializeOwned>(
    status: u16,
    status_text: &str,
    body: &str,
) -> Result<T, WorkflowError> {
    if !(200..300).contains(&status) {
        return Err(WorkflowError::Server(format!("{} {}", status, status_text)));
    }
    let envelope: ApiResponse<T> = serde_json::from_str(body)
        .map_err(|e| WorkflowError::Server(format!("Failed to parse response: {}", e)))?;
    Ok(envelope.into_result()?)
}

/// A refused search means the order does not exist
fn search_error(err: WorkflowError) -> WorkflowError {
    match err {
        WorkflowError::Domain(message) => WorkflowError::NotFound(message),
        other => other,
    }
}

#[async_trait(?Send)]
impl ReturnOrderApi for HttpReturnOrderApi {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, WorkflowError> {
        if query.is_empty() {
            return Err(WorkflowError::NotFound(
                "Order not found: neither sales order nor order number given".into(),
            ));
        }
        let qs = serde_qs::to_string(query)
            .map_err(|e| WorkflowError::validation(format!("Bad search query: {}", e)))?;
        let response = Request::get(&format!("{}?{}", self.url("/search"), qs))
            .send()
            .await
            .map_err(network)?;
        unwrap_envelope(response).await.map_err(search_error)
    }

    async fn create(
        &self,
        request: &CreateReturnRequest,
    ) -> Result<CreateReturnResponse, WorkflowError> {
        let response = Request::post(&self.url("/create"))
            .json(request)
            .map_err(|e| WorkflowError::validation(format!("Failed to serialize request: {}", e)))?
            .send()
            .await
            .map_err(network)?;
        unwrap_envelope(response).await
    }

    async fn generate_reference(&self, order_no: &str) -> Result<String, WorkflowError> {
        let path = format!("/generate-sr/{}", urlencoding::encode(order_no));
        let response = Request::post(&self.url(&path))
            .send()
            .await
            .map_err(network)?;
        unwrap_envelope(response).await
    }

    async fn update_reference(
        &self,
        order_no: &str,
        reference_no: &str,
    ) -> Result<String, WorkflowError> {
        let path = format!("/update-sr/{}", urlencoding::encode(order_no));
        let body = UpdateReferenceRequest {
            reference_no: reference_no.to_string(),
        };
        let response = Request::post(&self.url(&path))
            .json(&body)
            .map_err(|e| WorkflowError::validation(format!("Failed to serialize request: {}", e)))?
            .send()
            .await
            .map_err(network)?;
        let updated: UpdateReferenceResponse = unwrap_envelope(response).await?;
        Ok(updated.reference_no)
    }

    async fn update_status(
        &self,
        order_no: &str,
        request: &UpdateStatusRequest,
    ) -> Result<UpdateStatusResponse, WorkflowError> {
        let path = format!("/update-status/{}", urlencoding::encode(order_no));
        let response = Request::post(&self.url(&path))
            .json(request)
            .map_err(|e| WorkflowError::validation(format!("Failed to serialize request: {}", e)))?
            .send()
            .await
            .map_err(network)?;
        unwrap_envelope(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_2xx_is_server_error() {
        let result: Result<String, _> = decode_envelope(502, "Bad Gateway", "<html></html>");
        assert_eq!(result, Err(WorkflowError::Server("502 Bad Gateway".into())));

        let result: Result<String, _> =
            decode_envelope(404, "Not Found", r#"{"success":true,"data":"x"}"#);
        assert!(matches!(result, Err(WorkflowError::Server(_))));
    }

    #[test]
    fn test_unparsable_body_is_server_error() {
        let result: Result<String, _> = decode_envelope(200, "OK", "not json");
        match result {
            Err(WorkflowError::Server(message)) => {
                assert!(message.starts_with("Failed to parse response"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_success_false_is_domain_error() {
        let body = r#"{"success":false,"message":"return order for ORD-1 already exists","data":null}"#;
        let result: Result<String, _> = decode_envelope(200, "OK", body);
        assert_eq!(
            result,
            Err(WorkflowError::Domain("return order for ORD-1 already exists".into()))
        );
    }

    #[test]
    fn test_success_without_data_is_server_error() {
        let result: Result<String, _> = decode_envelope(200, "OK", r#"{"success":true}"#);
        assert!(matches!(result, Err(WorkflowError::Server(_))));
    }

    #[test]
    fn test_success_returns_data() {
        let body = r#"{"success":true,"data":"SR-20261018-000001"}"#;
        let result: Result<String, _> = decode_envelope(200, "OK", body);
        assert_eq!(result, Ok("SR-20261018-000001".to_string()));
    }

    #[test]
    fn test_refused_search_is_not_found() {
        let body = r#"{"success":false,"message":"Order not found: ORD-9"}"#;
        let result = decode_envelope::<String>(200, "OK", body).map_err(search_error);
        assert_eq!(
            result,
            Err(WorkflowError::NotFound("Order not found: ORD-9".into()))
        );

        let network = search_error(WorkflowError::Network("offline".into()));
        assert_eq!(network, WorkflowError::Network("offline".into()));
    }
}
