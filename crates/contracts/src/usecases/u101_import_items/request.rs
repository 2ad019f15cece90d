use serde::{Deserialize, Serialize};

use crate::domain::a003_item::CreateItemRequest;

/// Тело запроса пакетного создания номенклатуры во внешнем API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCreateItemsRequest {
    /// Строки в порядке исходного файла
    pub items: Vec<CreateItemRequest>,
}
