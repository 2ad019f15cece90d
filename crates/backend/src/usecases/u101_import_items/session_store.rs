use contracts::usecases::u101_import_items::{ImportSessionView, ImportStage};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::session::ImportSession;

/// Хранилище сессий импорта (in-memory)
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, ImportSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: ImportSession) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(session.id().to_string(), session);
    }

    pub fn get_view(&self, session_id: &str) -> Option<ImportSessionView> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.get(session_id).map(ImportSession::view)
    }

    /// Выполняет изменение сессии под блокировкой записи.
    ///
    /// Замыкание синхронное: блокировка не удерживается через `.await`.
    pub fn update<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut ImportSession) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.get_mut(session_id).map(f)
    }

    pub fn remove(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Удаляет сессии без изменений дольше `max_age_hours`; идущий импорт не трогает
    pub fn cleanup_old_sessions(&self, max_age_hours: i64) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let now = chrono::Utc::now();
        let before = sessions.len();
        sessions.retain(|_, s| {
            s.stage() == ImportStage::Importing || (now - s.updated_at()).num_hours() < max_age_hours
        });
        before - sessions.len()
    }
}
