use chrono::{DateTime, Utc};
use contracts::usecases::u101_import_items::{
    BulkCreateItemsResponse, CommitResult, ImportSessionView, ImportStage,
};
use uuid::Uuid;

use super::commit::{reconcile, CommitBatch};
use super::csv_tokenizer::{decode_utf8, tokenize};
use super::error::ImportError;
use super::file_check::{check_selected_file, FileLimits};
use super::reference_matcher::ReferenceData;
use super::row_normalizer::{normalize, RawRow};
use super::row_validator::{validate_rows, ValidationOutcome};
use crate::shared::format::format_number;

/// Выбранный пользователем файл
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
}

/// Состояние одной попытки импорта.
///
/// Переходы: `upload -> preview -> importing -> done`, при ошибке отправки
/// `importing -> preview`, сброс из любого этапа в `upload`.
#[derive(Debug, Clone)]
pub struct ImportSession {
    id: String,
    stage: ImportStage,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    references: ReferenceData,
    file: Option<SelectedFile>,
    rows: Vec<RawRow>,
    outcome: ValidationOutcome,
    result: Option<CommitResult>,
    error: Option<String>,
    batch_key: Uuid,
    in_flight: usize,
}

impl ImportSession {
    pub fn new(id: String, references: ReferenceData) -> Self {
        let now = Utc::now();
        Self {
            id,
            stage: ImportStage::Upload,
            created_at: now,
            updated_at: now,
            references,
            file: None,
            rows: Vec::new(),
            outcome: ValidationOutcome::default(),
            result: None,
            error: None,
            batch_key: Uuid::new_v4(),
            in_flight: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stage(&self) -> ImportStage {
        self.stage
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn batch_key(&self) -> Uuid {
        self.batch_key
    }

    pub fn outcome(&self) -> &ValidationOutcome {
        &self.outcome
    }

    pub fn result(&self) -> Option<&CommitResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Выбор файла: проверка, разбор, нормализация и проверка строк.
    ///
    /// Повторный выбор в `preview` заменяет предыдущий файл. При любой ошибке
    /// сессия остаётся в `upload`, ошибка сохраняется и возвращается.
    pub fn select_file(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        limits: &FileLimits,
    ) -> Result<(), ImportError> {
        match self.stage {
            ImportStage::Upload | ImportStage::Preview => {}
            actual => return Err(ImportError::InvalidStage { actual }),
        }

        self.clear_batch();

        match Self::parse_file(file_name, bytes, limits, &self.references) {
            Ok((rows, outcome)) => {
                tracing::info!(
                    "Import session {}: parsed \"{}\" ({} bytes, {} rows, {} valid, {} invalid)",
                    self.id,
                    file_name,
                    format_number(bytes.len() as u64),
                    outcome.total(),
                    outcome.valid.len(),
                    outcome.invalid.len()
                );
                self.file = Some(SelectedFile {
                    name: file_name.to_string(),
                    size: bytes.len() as u64,
                });
                self.rows = rows;
                self.outcome = outcome;
                self.stage = ImportStage::Preview;
                self.touch();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Import session {}: file rejected: {}", self.id, e);
                self.error = Some(e.to_string());
                self.touch();
                Err(e)
            }
        }
    }

    /// Отказ в файле, который не дочитан до конца (превышен лимит размера).
    ///
    /// Проверки те же, что в `select_file`: сначала расширение, затем размер.
    pub fn reject_file(
        &mut self,
        file_name: &str,
        received: u64,
        limits: &FileLimits,
    ) -> ImportError {
        match self.stage {
            ImportStage::Upload | ImportStage::Preview => {}
            actual => return ImportError::InvalidStage { actual },
        }

        self.clear_batch();
        let err = check_selected_file(file_name, received, limits)
            .err()
            .unwrap_or_else(|| ImportError::file_too_large(received, limits.max_file_size));
        tracing::warn!("Import session {}: file rejected: {}", self.id, err);
        self.error = Some(err.to_string());
        self.touch();
        err
    }

    fn parse_file(
        file_name: &str,
        bytes: &[u8],
        limits: &FileLimits,
        references: &ReferenceData,
    ) -> Result<(Vec<RawRow>, ValidationOutcome), ImportError> {
        check_selected_file(file_name, bytes.len() as u64, limits)?;
        let text = decode_utf8(bytes)?;
        let table = tokenize(text)?;
        let rows = normalize(&table)?;
        let outcome = validate_rows(&rows, references);
        Ok((rows, outcome))
    }

    /// `preview -> importing`: собирает пакет из корректных строк
    pub fn begin_commit(&mut self) -> Result<CommitBatch, ImportError> {
        if self.stage != ImportStage::Preview {
            return Err(ImportError::InvalidStage { actual: self.stage });
        }
        if self.outcome.valid.is_empty() {
            return Err(ImportError::NothingToImport);
        }

        let batch = CommitBatch::from_rows(&self.outcome.valid, self.batch_key.to_string());
        self.in_flight = batch.len();
        self.error = None;
        self.stage = ImportStage::Importing;
        self.touch();
        Ok(batch)
    }

    /// `importing -> done`: сохраняет результат пакетного создания
    pub fn finish_commit(
        &mut self,
        response: BulkCreateItemsResponse,
    ) -> Result<&CommitResult, ImportError> {
        if self.stage != ImportStage::Importing {
            return Err(ImportError::InvalidStage { actual: self.stage });
        }

        let result = reconcile(self.in_flight, response);
        tracing::info!(
            "Import session {}: done, created={}, failed={}",
            self.id,
            result.created_count(),
            result.failed_count()
        );

        self.in_flight = 0;
        self.stage = ImportStage::Done;
        self.touch();
        let result = &*self.result.insert(result);
        Ok(result)
    }

    /// `importing -> preview`: запрос целиком отклонён, строки сохраняются
    pub fn fail_commit(&mut self, message: String) {
        if self.stage != ImportStage::Importing {
            return;
        }
        self.in_flight = 0;
        self.error = Some(message);
        self.stage = ImportStage::Preview;
        self.touch();
    }

    /// `upload`/`preview`/`done` -> `upload`; справочники остаются.
    ///
    /// Пока пакет отправляется (`importing`), сброс запрещён: ответ сервера
    /// должен попасть в ту же сессию, что и отправленные строки.
    pub fn reset(&mut self) -> Result<(), ImportError> {
        if self.stage == ImportStage::Importing {
            return Err(ImportError::InvalidStage { actual: self.stage });
        }
        self.clear_batch();
        self.touch();
        Ok(())
    }

    fn clear_batch(&mut self) {
        self.stage = ImportStage::Upload;
        self.file = None;
        self.rows.clear();
        self.outcome = ValidationOutcome::default();
        self.result = None;
        self.error = None;
        self.in_flight = 0;
        self.batch_key = Uuid::new_v4();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn view(&self) -> ImportSessionView {
        ImportSessionView {
            session_id: self.id.clone(),
            stage: self.stage,
            created_at: self.created_at,
            updated_at: self.updated_at,
            file_name: self.file.as_ref().map(|f| f.name.clone()),
            file_size: self.file.as_ref().map(|f| f.size),
            total_rows: self.rows.len(),
            valid: self.outcome.valid.clone(),
            invalid: self.outcome.invalid.clone(),
            result: self.result.clone(),
            error: self.error.clone(),
            categories_loaded: self.references.categories.len(),
            units_loaded: self.references.units.len(),
        }
    }
}
