use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::usecases::u101_import_items::ImportExecutor;

/// Запас на multipart-обвязку сверх лимита самого файла
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Слишком большой файл не сохраняется, но дочитывается до этого лимита
/// (в разах от лимита файла), чтобы клиент успел получить ответ 413
const OVERSIZE_DRAIN_FACTOR: usize = 2;

/// Конфигурация всех роутов приложения
pub fn configure_routes(executor: Arc<ImportExecutor>) -> Router {
    let body_limit =
        executor.limits().max_file_size as usize * OVERSIZE_DRAIN_FACTOR + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // UseCase u101: Import items from CSV
        // ========================================
        .route(
            "/api/u101/template",
            get(handlers::usecases::u101_download_template),
        )
        .route(
            "/api/u101/sessions",
            post(handlers::usecases::u101_create_session),
        )
        .route(
            "/api/u101/sessions/:session_id",
            get(handlers::usecases::u101_get_session)
                .delete(handlers::usecases::u101_discard_session),
        )
        .route(
            "/api/u101/sessions/:session_id/upload",
            post(handlers::usecases::u101_upload_file),
        )
        .route(
            "/api/u101/sessions/:session_id/commit",
            post(handlers::usecases::u101_commit),
        )
        .route(
            "/api/u101/sessions/:session_id/reset",
            post(handlers::usecases::u101_reset),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(executor)
}
