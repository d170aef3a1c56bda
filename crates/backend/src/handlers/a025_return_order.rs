use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use contracts::domain::a025_return_order::dto::{
    CreateReturnRequest, CreateReturnResponse, SearchQuery, SearchResult, UpdateReferenceRequest,
    UpdateReferenceResponse, UpdateStatusRequest, UpdateStatusResponse,
};
use contracts::shared::api_response::ApiResponse;

use crate::domain::a025_return_order::service::{ReturnOrderService, ServiceError};

pub type AppState = Arc<ReturnOrderService>;

/// Ошибки домена уходят с HTTP 200 и `success=false`
fn envelope<T>(operation: &str, result: Result<T, ServiceError>) -> Json<ApiResponse<T>> {
    match result {
        Ok(data) => Json(ApiResponse::ok(data)),
        Err(e) => {
            tracing::warn!("{} failed: {}", operation, e);
            Json(ApiResponse::fail(e.to_string()))
        }
    }
}

/// GET /api/order/search?soNo=&orderNo=
pub async fn search(
    State(service): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<ApiResponse<SearchResult>> {
    envelope("search", service.search(query).await)
}

/// POST /api/order/create
pub async fn create(
    State(service): State<AppState>,
    Json(request): Json<CreateReturnRequest>,
) -> Json<ApiResponse<CreateReturnResponse>> {
    envelope("create", service.create(request).await)
}

/// POST /api/order/generate-sr/:order_no
pub async fn generate_reference(
    State(service): State<AppState>,
    Path(order_no): Path<String>,
) -> Json<ApiResponse<String>> {
    envelope("generate-sr", service.generate_reference(&order_no).await)
}

/// POST /api/order/update-sr/:order_no
pub async fn update_reference(
    State(service): State<AppState>,
    Path(order_no): Path<String>,
    Json(request): Json<UpdateReferenceRequest>,
) -> Json<ApiResponse<UpdateReferenceResponse>> {
    let result = service
        .update_reference(&order_no, &request.reference_no)
        .await
        .map(|reference_no| UpdateReferenceResponse { reference_no });
    envelope("update-sr", result)
}

/// POST /api/order/update-status/:order_no
pub async fn update_status(
    State(service): State<AppState>,
    Path(order_no): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Json<ApiResponse<UpdateStatusResponse>> {
    envelope("update-status", service.update_status(&order_no, request).await)
}
