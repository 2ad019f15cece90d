use serde::{Deserialize, Serialize};

crate::uuid_id!(UnitOfMeasureId);

/// Единица измерения (UOM): "EA" - штука, "PKT" - упаковка и т.д.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOfMeasure {
    pub id: UnitOfMeasureId,
    pub code: String,
    pub name: String,
}

impl UnitOfMeasure {
    pub fn new(id: UnitOfMeasureId, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
        }
    }
}
