use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::usecases::common::UseCaseError;
use contracts::usecases::u101_import_items::ImportSessionView;
use std::sync::Arc;

use crate::usecases::u101_import_items::{template, ImportError, ImportExecutor};

// ============================================================================
// UseCase u101: Import items from CSV
// ============================================================================

/// Ошибка HTTP-обработчика: статус и тело `UseCaseError`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: UseCaseError,
}

impl ApiError {
    fn new(status: StatusCode, body: UseCaseError) -> Self {
        Self { status, body }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        let message = err.to_string();
        match err {
            ImportError::FileTooLarge { size, limit, .. } => Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                UseCaseError::validation(message)
                    .with_details(format!("received {} bytes, limit {} bytes", size, limit)),
            ),
            ImportError::InvalidFileType(_) | ImportError::Parse(_) | ImportError::Schema(_) => {
                Self::new(StatusCode::BAD_REQUEST, UseCaseError::validation(message))
            }
            ImportError::SessionNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, UseCaseError::not_found(message))
            }
            ImportError::NothingToImport | ImportError::InvalidStage { .. } => {
                Self::new(StatusCode::CONFLICT, UseCaseError::conflict(message))
            }
            ImportError::ReferenceData(_) | ImportError::Commit(_) => {
                Self::new(StatusCode::BAD_GATEWAY, UseCaseError::external(message))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// GET /api/u101/template
pub async fn u101_download_template() -> Result<Response, ApiError> {
    let body = template::template_csv().map_err(|e| {
        tracing::error!("Failed to build import template: {}", e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.into())
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", template::TEMPLATE_FILE_NAME),
            ),
        ],
        body,
    )
        .into_response())
}

/// POST /api/u101/sessions
pub async fn u101_create_session(
    State(executor): State<Arc<ImportExecutor>>,
) -> Result<(StatusCode, Json<ImportSessionView>), ApiError> {
    let view = executor.create_session().await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/u101/sessions/:session_id
pub async fn u101_get_session(
    State(executor): State<Arc<ImportExecutor>>,
    Path(session_id): Path<String>,
) -> Result<Json<ImportSessionView>, ApiError> {
    Ok(Json(executor.get_session(&session_id)?))
}

/// DELETE /api/u101/sessions/:session_id
pub async fn u101_discard_session(
    State(executor): State<Arc<ImportExecutor>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    executor.discard(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/u101/sessions/:session_id/upload (multipart, поле `file`)
///
/// Файл читается по частям: как только превышен лимит размера, загрузка
/// прерывается с `FileTooLarge`, не дожидаясь конца тела запроса.
pub async fn u101_upload_file(
    State(executor): State<Arc<ImportExecutor>>,
    Path(session_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ImportSessionView>, ApiError> {
    let limit = executor.limits().max_file_size;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::from(ImportError::file_too_large(limit + 1, limit));
        }
        ApiError::new(
            StatusCode::BAD_REQUEST,
            UseCaseError::validation("Invalid multipart body").with_details(e.body_text()),
        )
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let mut bytes = Vec::new();
        let mut received: u64 = 0;
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    received += chunk.len() as u64;
                    if received > limit {
                        // дочитываем остаток (до общего лимита тела), чтобы клиент получил ответ
                        while let Ok(Some(_)) = field.chunk().await {}
                        return Err(executor.reject_file(&session_id, &file_name, received).into());
                    }
                    bytes.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                // тело запроса длиннее общего лимита
                Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                    let received = received.max(limit + 1);
                    return Err(executor.reject_file(&session_id, &file_name, received).into());
                }
                Err(e) => {
                    return Err(ApiError::new(
                        StatusCode::BAD_REQUEST,
                        UseCaseError::validation("Failed to read uploaded file")
                            .with_details(e.body_text()),
                    ))
                }
            }
        }

        let view = executor.upload(&session_id, &file_name, &bytes)?;
        return Ok(Json(view));
    }

    Err(ApiError::new(
        StatusCode::BAD_REQUEST,
        UseCaseError::validation("Multipart field \"file\" is missing"),
    ))
}

/// POST /api/u101/sessions/:session_id/commit
pub async fn u101_commit(
    State(executor): State<Arc<ImportExecutor>>,
    Path(session_id): Path<String>,
) -> Result<Json<ImportSessionView>, ApiError> {
    Ok(Json(executor.commit(&session_id).await?))
}

/// POST /api/u101/sessions/:session_id/reset
pub async fn u101_reset(
    State(executor): State<Arc<ImportExecutor>>,
    Path(session_id): Path<String>,
) -> Result<Json<ImportSessionView>, ApiError> {
    Ok(Json(executor.reset(&session_id)?))
}
