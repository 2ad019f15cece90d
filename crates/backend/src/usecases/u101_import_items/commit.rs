use contracts::domain::a003_item::CreateItemRequest;
use contracts::usecases::u101_import_items::{BulkCreateItemsResponse, CommitResult, ValidatedRow};

use super::row_validator::to_create_request;

/// Пакет на отправку: записи на создание в порядке файла и ключ пакета
#[derive(Debug, Clone)]
pub struct CommitBatch {
    pub items: Vec<CreateItemRequest>,
    pub idempotency_key: String,
}

impl CommitBatch {
    pub fn from_rows(rows: &[ValidatedRow], idempotency_key: String) -> Self {
        Self {
            items: rows.iter().map(to_create_request).collect(),
            idempotency_key,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Сводит ответ сервера в результат для пользователя.
///
/// Строки, о которых сервер не сообщил, считаются в `unaccounted`.
pub fn reconcile(submitted: usize, response: BulkCreateItemsResponse) -> CommitResult {
    let accounted = response.created.len() + response.errors.len();
    let unaccounted = submitted.saturating_sub(accounted);

    if unaccounted > 0 {
        tracing::warn!(
            "Bulk create reported {} of {} submitted rows, {} unaccounted",
            accounted,
            submitted,
            unaccounted
        );
    }

    CommitResult {
        created: response.created,
        failed: response.errors,
        unaccounted,
    }
}
