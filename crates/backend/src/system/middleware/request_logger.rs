use axum::body::to_bytes;
use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::shared::format::format_bytes;

/// Middleware для логирования HTTP запросов
///
/// Пишет метод, путь, статус, длительность и размер ответа.
/// Ответы с ошибкой (4xx/5xx) логируются уровнем warn.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();
    let status = parts.status.as_u16();

    // Читаем тело ответа, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                "{} {} -> {} | {}ms | body error: {}",
                method,
                path,
                status,
                start.elapsed().as_millis(),
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    let elapsed = start.elapsed().as_millis();
    let size = format_bytes(bytes.len() as u64);
    if parts.status.is_client_error() || parts.status.is_server_error() {
        tracing::warn!("{} {} -> {} | {}ms | {}", method, path, status, elapsed, size);
    } else {
        tracing::info!("{} {} -> {} | {}ms | {}", method, path, status, elapsed, size);
    }

    Response::from_parts(parts, Body::from(bytes))
}
