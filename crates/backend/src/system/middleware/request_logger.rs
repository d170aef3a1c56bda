use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::shared::format::format_number;

/// ANSI-цвет строки по статусу: 2xx голубой, 4xx жёлтый, остальное красный
fn status_color(status: StatusCode) -> &'static str {
    if status.is_success() {
        "36"
    } else if status.is_client_error() {
        "33"
    } else {
        "31"
    }
}

/// Middleware для логирования HTTP запросов
///
/// Одна строка на запрос: время (UTC), длительность, размер ответа, статус, метод, путь
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Тело читается целиком, чтобы узнать размер
    let (body, size) = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let size = format_number(bytes.len());
            (Body::from(bytes), size)
        }
        Err(_) => (Body::default(), "error".to_string()),
    };

    println!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        status_color(parts.status),
        Utc::now().format("%H:%M:%S"),
        start.elapsed().as_millis(),
        size,
        parts.status.as_u16(),
        method,
        path
    );

    Response::from_parts(parts, body)
}
