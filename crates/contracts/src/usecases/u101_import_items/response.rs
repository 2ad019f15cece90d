use serde::{Deserialize, Serialize};

use crate::domain::a003_item::ItemSummary;

/// Ответ внешнего API на пакетное создание
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCreateItemsResponse {
    #[serde(default)]
    pub created: Vec<ItemSummary>,
    #[serde(default)]
    pub errors: Vec<RowFailure>,
}

/// Строка, отклонённая сервером (например, из-за уникальности кода)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    /// Номер строки исходного файла
    pub row: usize,
    pub name: String,
    pub error: String,
}

/// Итог фиксации импорта, который видит пользователь
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub created: Vec<ItemSummary>,
    pub failed: Vec<RowFailure>,

    /// Отправленные строки, о которых сервер не сообщил ни успеха, ни ошибки
    #[serde(default)]
    pub unaccounted: usize,
}

impl CommitResult {
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}
