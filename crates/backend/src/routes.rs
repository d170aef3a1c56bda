use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::a025_return_order::{self, AppState};

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // A025 RETURN ORDER
        // ========================================
        .route("/api/order/search", get(a025_return_order::search))
        .route("/api/order/create", post(a025_return_order::create))
        .route(
            "/api/order/generate-sr/:order_no",
            post(a025_return_order::generate_reference),
        )
        .route(
            "/api/order/update-sr/:order_no",
            post(a025_return_order::update_reference),
        )
        .route(
            "/api/order/update-status/:order_no",
            post(a025_return_order::update_status),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a025_return_order::service::ReturnOrderService;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use contracts::domain::a025_return_order::dto::SearchResult;
    use contracts::shared::api_response::ApiResponse;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app() -> Router {
        let service = ReturnOrderService::new("SR");
        service.seed_demo_orders().await;
        configure_routes(Arc::new(service))
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_search_returns_envelope() {
        let request = Request::get("/api/order/search?orderNo=ORD-1001")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(app().await, request).await;

        assert_eq!(status, StatusCode::OK);
        let envelope: ApiResponse<SearchResult> = serde_json::from_value(body).unwrap();
        let result = envelope.into_result().unwrap();
        assert_eq!(result.head.so_no, "SO-5001");
    }

    #[tokio::test]
    async fn test_domain_failure_is_success_false_with_200() {
        let request = Request::post("/api/order/generate-sr/ORD-1001")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(app().await, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Order not found: ORD-1001");
    }

    #[tokio::test]
    async fn test_create_then_generate_reference() {
        let app = app().await;
        let create = serde_json::json!({
            "orderNo": "ORD-1001",
            "soNo": "SO-5001",
            "channel": "marketplace",
            "locationTo": "Return",
            "returnDate": "2026-10-18",
            "warehouseCode": "WH01",
            "items": [{"sku": "SKU-1001", "itemName": "", "qty": 5, "returnQty": 3, "price": 4990.0}]
        });
        let request = Request::post("/api/order/create")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(create.to_string()))
            .unwrap();
        let (_, body) = call(app.clone(), request).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["orderNo"], "ORD-1001");
        assert_eq!(body["data"]["isCNCreated"], false);

        let request = Request::post("/api/order/generate-sr/ORD-1001")
            .body(Body::empty())
            .unwrap();
        let (_, body) = call(app, request).await;
        assert_eq!(body["success"], true);
        assert!(body["data"].as_str().unwrap().starts_with("SR-"));
    }
}
