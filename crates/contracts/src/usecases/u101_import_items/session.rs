use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::response::CommitResult;
use crate::domain::a001_category::CategoryId;
use crate::domain::a002_unit_of_measure::UnitOfMeasureId;

/// Этап сессии импорта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    /// Ожидание файла
    Upload,
    /// Файл разобран, строки проверены
    Preview,
    /// Идёт пакетное создание
    Importing,
    /// Импорт завершён, показаны результаты
    Done,
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ImportStage::Upload => "upload",
            ImportStage::Preview => "preview",
            ImportStage::Importing => "importing",
            ImportStage::Done => "done",
        };
        write!(f, "{}", s)
    }
}

/// Строка CSV после проверки и сопоставления справочников.
///
/// Строка корректна тогда и только тогда, когда `errors` пуст.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedRow {
    /// Номер строки в файле (заголовок - строка 1)
    pub line: usize,
    pub name: String,
    pub code: String,
    pub description: String,
    /// Текст категории как в файле
    pub category: String,
    /// Текст единицы измерения как в файле
    pub uom: String,
    pub category_id: Option<CategoryId>,
    pub uom_id: Option<UnitOfMeasureId>,
    pub errors: Vec<String>,
}

impl ValidatedRow {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Снимок сессии импорта для клиента
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSessionView {
    pub session_id: String,
    pub stage: ImportStage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub file_name: Option<String>,
    pub file_size: Option<u64>,

    /// Всего непустых строк данных в файле
    pub total_rows: usize,
    pub valid: Vec<ValidatedRow>,
    pub invalid: Vec<ValidatedRow>,

    pub result: Option<CommitResult>,

    /// Последняя ошибка (файл, разбор, схема, отправка)
    pub error: Option<String>,

    pub categories_loaded: usize,
    pub units_loaded: usize,
}
