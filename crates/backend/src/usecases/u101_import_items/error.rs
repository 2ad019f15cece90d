use contracts::usecases::u101_import_items::ImportStage;
use thiserror::Error;

use crate::shared::format::format_bytes;

const MIB: u64 = 1024 * 1024;

/// Ошибки конвейера импорта номенклатуры
///
/// Ошибки проверки отдельных строк сюда не попадают: они копятся в
/// `ValidatedRow::errors` и не блокируют импорт.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Please select a CSV file (got \"{0}\")")]
    InvalidFileType(String),

    /// `size` - сколько байт получено к моменту отказа
    #[error("File size must be less than {limit_text}")]
    FileTooLarge {
        size: u64,
        limit: u64,
        limit_text: String,
    },

    #[error("Failed to parse CSV: {0}")]
    Parse(String),

    #[error("{0}")]
    Schema(String),

    #[error("Failed to load reference data: {0}")]
    ReferenceData(String),

    #[error("Import failed: {0}")]
    Commit(String),

    #[error("No valid rows to import")]
    NothingToImport,

    #[error("Import session not found: {0}")]
    SessionNotFound(String),

    #[error("Operation is not allowed in stage \"{actual}\"")]
    InvalidStage { actual: ImportStage },
}

impl ImportError {
    pub fn file_too_large(size: u64, limit: u64) -> Self {
        ImportError::FileTooLarge {
            size,
            limit,
            limit_text: format_limit(limit),
        }
    }

    /// Ошибка выбора файла, разбора или схемы (пользователь исправляет файл)
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            ImportError::InvalidFileType(_)
                | ImportError::FileTooLarge { .. }
                | ImportError::Parse(_)
                | ImportError::Schema(_)
        )
    }
}

/// Лимит для сообщения: целые мегабайты как "5MB", остальное через `format_bytes`
fn format_limit(limit: u64) -> String {
    if limit >= MIB && limit % MIB == 0 {
        format!("{}MB", limit / MIB)
    } else {
        format_bytes(limit)
    }
}
