use super::error::ImportError;
use super::file_check::FileLimits;
use super::items_api_client::ItemsApi;
use super::reference_matcher::ReferenceData;
use super::session::ImportSession;
use super::session_store::SessionStore;
use contracts::usecases::u101_import_items::ImportSessionView;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Executor для UseCase импорта номенклатуры из CSV
pub struct ImportExecutor {
    api: Arc<dyn ItemsApi>,
    pub store: SessionStore,
    limits: FileLimits,
}

impl ImportExecutor {
    pub fn new(api: Arc<dyn ItemsApi>, store: SessionStore, limits: FileLimits) -> Self {
        Self { api, store, limits }
    }

    pub fn limits(&self) -> FileLimits {
        self.limits
    }

    /// Создать сессию: один раз загружает категории и единицы измерения
    pub async fn create_session(&self) -> Result<ImportSessionView, ImportError> {
        let (categories, units) =
            tokio::try_join!(self.api.list_categories(), self.api.list_units()).map_err(|e| {
                tracing::error!("Failed to load reference data: {}", e);
                ImportError::ReferenceData(e.to_string())
            })?;

        let session_id = Uuid::new_v4().to_string();
        let session = ImportSession::new(session_id.clone(), ReferenceData::new(categories, units));
        let view = session.view();
        self.store.insert(session);

        tracing::info!(
            "Import session {} created ({} categories, {} units)",
            session_id,
            view.categories_loaded,
            view.units_loaded
        );
        Ok(view)
    }

    pub fn get_session(&self, session_id: &str) -> Result<ImportSessionView, ImportError> {
        self.store
            .get_view(session_id)
            .ok_or_else(|| ImportError::SessionNotFound(session_id.to_string()))
    }

    /// Загрузить файл: проверка, разбор и проверка строк (без сетевых вызовов)
    pub fn upload(
        &self,
        session_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ImportSessionView, ImportError> {
        self.store
            .update(session_id, |s| -> Result<ImportSessionView, ImportError> {
                s.select_file(file_name, bytes, &self.limits)?;
                Ok(s.view())
            })
            .ok_or_else(|| ImportError::SessionNotFound(session_id.to_string()))?
    }

    /// Отказ в файле, загрузка которого прервана на `received` байтах
    pub fn reject_file(&self, session_id: &str, file_name: &str, received: u64) -> ImportError {
        self.store
            .update(session_id, |s| s.reject_file(file_name, received, &self.limits))
            .unwrap_or_else(|| ImportError::SessionNotFound(session_id.to_string()))
    }

    /// Отправить корректные строки одним пакетом.
    ///
    /// При отказе всего запроса сессия возвращается в `preview` с сохранёнными
    /// строками, чтобы пользователь мог повторить без повторной загрузки.
    pub async fn commit(&self, session_id: &str) -> Result<ImportSessionView, ImportError> {
        let batch = self
            .store
            .update(session_id, |s| s.begin_commit())
            .ok_or_else(|| ImportError::SessionNotFound(session_id.to_string()))??;

        tracing::info!(
            "Import session {}: submitting {} items",
            session_id,
            batch.len()
        );

        match self
            .api
            .bulk_create(batch.items, &batch.idempotency_key)
            .await
        {
            Ok(response) => {
                let created = response.created.len();
                self.store
                    .update(session_id, |s| -> Result<ImportSessionView, ImportError> {
                        s.finish_commit(response)?;
                        Ok(s.view())
                    })
                    .ok_or_else(|| {
                        tracing::warn!(
                            "Import session {} was discarded before bulk create finished ({} items created)",
                            session_id,
                            created
                        );
                        ImportError::SessionNotFound(session_id.to_string())
                    })?
            }
            Err(e) => {
                let err = ImportError::Commit(e.to_string());
                tracing::error!("Import session {}: {}", session_id, err);
                let message = err.to_string();
                self.store
                    .update(session_id, move |s| s.fail_commit(message));
                Err(err)
            }
        }
    }

    /// Начать заново: -> `upload` (кроме `importing`)
    pub fn reset(&self, session_id: &str) -> Result<ImportSessionView, ImportError> {
        self.store
            .update(session_id, |s| -> Result<ImportSessionView, ImportError> {
                s.reset()?;
                Ok(s.view())
            })
            .ok_or_else(|| ImportError::SessionNotFound(session_id.to_string()))?
    }

    /// Удалить сессию (пользователь ушёл со страницы)
    pub fn discard(&self, session_id: &str) -> Result<(), ImportError> {
        if self.store.remove(session_id) {
            tracing::info!("Import session {} discarded", session_id);
            Ok(())
        } else {
            Err(ImportError::SessionNotFound(session_id.to_string()))
        }
    }
}

/// Периодически удаляет заброшенные сессии
pub fn spawn_session_cleanup(
    store: SessionStore,
    ttl_hours: i64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(600));
        loop {
            interval.tick().await;
            let removed = store.cleanup_old_sessions(ttl_hours);
            if removed > 0 {
                tracing::info!("Removed {} stale import sessions", removed);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use contracts::domain::a001_category::{Category, CategoryId};
    use contracts::domain::a002_unit_of_measure::{UnitOfMeasure, UnitOfMeasureId};
    use contracts::domain::a003_item::{CreateItemRequest, ItemId, ItemSummary};
    use contracts::usecases::u101_import_items::{BulkCreateItemsResponse, ImportStage, RowFailure};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    const SAMPLE: &str = "name,code,description,category,uom\n\
                          Ballpoint Pen,,Blue ink pen,Office Supplies,EA\n\
                          ,,Missing name,Office Supplies,EA";

    #[derive(Default)]
    struct FakeItemsApi {
        fail_references: bool,
        fail_commit: AtomicBool,
        block_commit: AtomicBool,
        release: tokio::sync::Notify,
        response: Mutex<Option<BulkCreateItemsResponse>>,
        calls: Mutex<Vec<(Vec<CreateItemRequest>, String)>>,
    }

    fn summary(name: &str) -> ItemSummary {
        ItemSummary {
            id: ItemId::new_v4(),
            name: name.to_string(),
            code: None,
        }
    }

    #[async_trait]
    impl ItemsApi for FakeItemsApi {
        async fn list_categories(&self) -> Result<Vec<Category>> {
            if self.fail_references {
                anyhow::bail!("HTTP 503 from categories");
            }
            Ok(vec![Category::new(CategoryId::new_v4(), "Office Supplies", None)])
        }

        async fn list_units(&self) -> Result<Vec<UnitOfMeasure>> {
            Ok(vec![UnitOfMeasure::new(UnitOfMeasureId::new_v4(), "EA", "Each")])
        }

        async fn bulk_create(
            &self,
            items: Vec<CreateItemRequest>,
            idempotency_key: &str,
        ) -> Result<BulkCreateItemsResponse> {
            let created = items.iter().map(|i| summary(&i.name)).collect();
            self.calls
                .lock()
                .unwrap()
                .push((items, idempotency_key.to_string()));

            if self.block_commit.load(Ordering::SeqCst) {
                self.release.notified().await;
            }
            if self.fail_commit.load(Ordering::SeqCst) {
                anyhow::bail!("connection refused");
            }
            let configured = self.response.lock().unwrap().clone();
            Ok(configured.unwrap_or(BulkCreateItemsResponse {
                created,
                errors: vec![],
            }))
        }
    }

    fn executor(api: Arc<FakeItemsApi>) -> ImportExecutor {
        ImportExecutor::new(api, SessionStore::new(), FileLimits::default())
    }

    #[tokio::test]
    async fn test_create_session_loads_references() {
        let exec = executor(Arc::new(FakeItemsApi::default()));
        let view = exec.create_session().await.unwrap();
        assert_eq!(view.stage, ImportStage::Upload);
        assert_eq!(view.categories_loaded, 1);
        assert_eq!(view.units_loaded, 1);
        assert_eq!(exec.store.len(), 1);
    }

    #[tokio::test]
    async fn test_reference_failure_creates_no_session() {
        let api = Arc::new(FakeItemsApi {
            fail_references: true,
            ..Default::default()
        });
        let exec = executor(api);
        let err = exec.create_session().await.unwrap_err();
        assert!(matches!(err, ImportError::ReferenceData(_)));
        assert!(exec.store.is_empty());
    }

    #[tokio::test]
    async fn test_upload_and_commit() {
        let api = Arc::new(FakeItemsApi::default());
        let exec = executor(api.clone());
        let id = exec.create_session().await.unwrap().session_id;

        let preview = exec.upload(&id, "items.csv", SAMPLE.as_bytes()).unwrap();
        assert_eq!(preview.stage, ImportStage::Preview);
        assert_eq!(preview.valid.len(), 1);
        assert_eq!(preview.invalid[0].errors, vec!["Name is required".to_string()]);

        let done = exec.commit(&id).await.unwrap();
        assert_eq!(done.stage, ImportStage::Done);
        let result = done.result.unwrap();
        assert_eq!(result.created[0].name, "Ballpoint Pen");

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.len(), 1);
        assert!(calls[0].0[0].category_id.is_some());
        assert!(calls[0].0[0].default_uom_id.is_some());
    }

    #[tokio::test]
    async fn test_wrong_file_type_is_rejected_before_parsing() {
        let exec = executor(Arc::new(FakeItemsApi::default()));
        let id = exec.create_session().await.unwrap().session_id;

        let err = exec.upload(&id, "items.txt", SAMPLE.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidFileType(_)));
        assert!(!matches!(err, ImportError::Parse(_)));

        let view = exec.get_session(&id).unwrap();
        assert_eq!(view.stage, ImportStage::Upload);
        assert!(view.error.is_some());
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_rows_and_retries_with_same_key() {
        let api = Arc::new(FakeItemsApi::default());
        api.fail_commit.store(true, Ordering::SeqCst);
        let exec = executor(api.clone());
        let id = exec.create_session().await.unwrap().session_id;
        exec.upload(&id, "items.csv", SAMPLE.as_bytes()).unwrap();

        let err = exec.commit(&id).await.unwrap_err();
        assert!(matches!(err, ImportError::Commit(_)));

        let view = exec.get_session(&id).unwrap();
        assert_eq!(view.stage, ImportStage::Preview);
        assert_eq!(view.valid.len(), 1);
        assert!(view.error.unwrap().contains("connection refused"));

        api.fail_commit.store(false, Ordering::SeqCst);
        let done = exec.commit(&id).await.unwrap();
        assert_eq!(done.stage, ImportStage::Done);

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, calls[1].1);
    }

    #[tokio::test]
    async fn test_partial_failure_is_listed_separately() {
        let api = Arc::new(FakeItemsApi::default());
        *api.response.lock().unwrap() = Some(BulkCreateItemsResponse {
            created: vec![summary("A"), summary("B")],
            errors: vec![RowFailure {
                row: 5,
                name: "C".to_string(),
                error: "duplicate code".to_string(),
            }],
        });
        let exec = executor(api);
        let id = exec.create_session().await.unwrap().session_id;
        exec.upload(&id, "items.csv", b"name\nA\nB\nC\n").unwrap();

        let result = exec.commit(&id).await.unwrap().result.unwrap();
        let created: Vec<&str> = result.created.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(created, vec!["A", "B"]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].name, "C");
        assert_eq!(result.failed[0].error, "duplicate code");
        assert_eq!(result.unaccounted, 0);
    }

    #[tokio::test]
    async fn test_commit_without_valid_rows() {
        let api = Arc::new(FakeItemsApi::default());
        let exec = executor(api.clone());
        let id = exec.create_session().await.unwrap().session_id;
        exec.upload(&id, "items.csv", b"name,uom\n,EA").unwrap();

        let err = exec.commit(&id).await.unwrap_err();
        assert!(matches!(err, ImportError::NothingToImport));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_and_discard() {
        let exec = executor(Arc::new(FakeItemsApi::default()));
        let id = exec.create_session().await.unwrap().session_id;
        exec.upload(&id, "items.csv", SAMPLE.as_bytes()).unwrap();

        let view = exec.reset(&id).unwrap();
        assert_eq!(view.stage, ImportStage::Upload);
        assert!(view.file_name.is_none());
        assert_eq!(view.total_rows, 0);

        exec.discard(&id).unwrap();
        assert!(matches!(
            exec.get_session(&id),
            Err(ImportError::SessionNotFound(_))
        ));
        assert!(matches!(exec.discard(&id), Err(ImportError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let exec = executor(Arc::new(FakeItemsApi::default()));
        assert!(matches!(
            exec.upload("nope", "items.csv", SAMPLE.as_bytes()),
            Err(ImportError::SessionNotFound(_))
        ));
        assert!(matches!(
            exec.commit("nope").await,
            Err(ImportError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reset_is_rejected_while_batch_is_in_flight() {
        let api = Arc::new(FakeItemsApi {
            block_commit: AtomicBool::new(true),
            ..Default::default()
        });
        let exec = Arc::new(executor(api.clone()));
        let id = exec.create_session().await.unwrap().session_id;
        exec.upload(&id, "items.csv", b"name\nA\nB\nC\n").unwrap();

        let commit = tokio::spawn({
            let exec = exec.clone();
            let id = id.clone();
            async move { exec.commit(&id).await }
        });
        while exec.get_session(&id).unwrap().stage != ImportStage::Importing {
            tokio::task::yield_now().await;
        }

        assert!(matches!(
            exec.reset(&id),
            Err(ImportError::InvalidStage {
                actual: ImportStage::Importing
            })
        ));
        assert!(matches!(
            exec.upload(&id, "second.csv", b"name\nSecond"),
            Err(ImportError::InvalidStage { .. })
        ));

        api.release.notify_one();
        let view = commit.await.unwrap().unwrap();
        assert_eq!(view.stage, ImportStage::Done);
        let created: Vec<String> = view
            .result
            .unwrap()
            .created
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(created, vec!["A", "B", "C"]);
        assert_eq!(api.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reject_file_records_error() {
        let exec = executor(Arc::new(FakeItemsApi::default()));
        let id = exec.create_session().await.unwrap().session_id;

        let err = exec.reject_file(&id, "items.csv", 6 * 1024 * 1024);
        assert!(matches!(err, ImportError::FileTooLarge { .. }));
        let view = exec.get_session(&id).unwrap();
        assert_eq!(view.stage, ImportStage::Upload);
        assert_eq!(view.error.as_deref(), Some("File size must be less than 5MB"));

        assert!(matches!(
            exec.reject_file("nope", "items.csv", 1),
            ImportError::SessionNotFound(_)
        ));
    }
}
