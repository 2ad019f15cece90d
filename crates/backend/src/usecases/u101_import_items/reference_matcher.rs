use contracts::domain::a001_category::{Category, CategoryId};
use contracts::domain::a002_unit_of_measure::{UnitOfMeasure, UnitOfMeasureId};

/// Справочники, загруженные в начале сессии импорта
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub categories: Vec<Category>,
    pub units: Vec<UnitOfMeasure>,
}

impl ReferenceData {
    pub fn new(categories: Vec<Category>, units: Vec<UnitOfMeasure>) -> Self {
        Self { categories, units }
    }

    /// Ищет категорию по имени или коду.
    ///
    /// Сравнение точное, без учёта регистра и пробелов по краям. При дублях в
    /// справочнике побеждает первая запись в порядке списка.
    pub fn match_category(&self, text: &str) -> Option<CategoryId> {
        let needle = normalize_key(text)?;
        self.categories
            .iter()
            .find(|c| {
                normalize_key(&c.name).as_deref() == Some(needle.as_str())
                    || c
                        .code
                        .as_deref()
                        .and_then(normalize_key)
                        .as_deref()
                        == Some(needle.as_str())
            })
            .map(|c| c.id)
    }

    /// Ищет единицу измерения по коду или имени (первая запись в порядке списка)
    pub fn match_unit(&self, text: &str) -> Option<UnitOfMeasureId> {
        let needle = normalize_key(text)?;
        self.units
            .iter()
            .find(|u| {
                normalize_key(&u.code).as_deref() == Some(needle.as_str())
                    || normalize_key(&u.name).as_deref() == Some(needle.as_str())
            })
            .map(|u| u.id)
    }
}

/// Ключ сравнения: trim + нижний регистр; пустая строка ключом не является
fn normalize_key(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}
