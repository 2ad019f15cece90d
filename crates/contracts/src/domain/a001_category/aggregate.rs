use serde::{Deserialize, Serialize};

crate::uuid_id!(CategoryId);

/// Категория номенклатуры (справочник внешнего API, только чтение)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    /// Отображаемое имя
    pub name: String,

    /// Короткий код, если задан
    #[serde(default)]
    pub code: Option<String>,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>, code: Option<&str>) -> Self {
        Self {
            id,
            name: name.into(),
            code: code.map(str::to_string),
        }
    }
}
