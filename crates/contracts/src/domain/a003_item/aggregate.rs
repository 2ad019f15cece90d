use serde::{Deserialize, Serialize};

use crate::domain::a001_category::CategoryId;
use crate::domain::a002_unit_of_measure::UnitOfMeasureId;

crate::uuid_id!(ItemId);

/// Запись на создание элемента номенклатуры закупок.
///
/// Отсутствующие значения сериализуются как `null`, а не опускаются.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub default_uom_id: Option<UnitOfMeasureId>,
}

/// Краткая информация о созданном элементе
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}
