use contracts::domain::a003_item::CreateItemRequest;
use contracts::usecases::u101_import_items::ValidatedRow;

use super::reference_matcher::ReferenceData;
use super::row_normalizer::RawRow;

/// Строки, разделённые на корректные и ошибочные (порядок файла сохраняется)
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub valid: Vec<ValidatedRow>,
    pub invalid: Vec<ValidatedRow>,
}

impl ValidationOutcome {
    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }
}

/// Проверяет одну строку и сопоставляет справочники
pub fn validate_row(row: &RawRow, references: &ReferenceData) -> ValidatedRow {
    let name = row.get("name").to_string();
    let category = row.get("category").to_string();
    let uom = row.get("uom").to_string();

    let category_id = references.match_category(&category);
    let uom_id = references.match_unit(&uom);

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push("Name is required".to_string());
    }
    if !category.is_empty() && category_id.is_none() {
        errors.push(format!("Unknown category: \"{}\"", category));
    }
    if !uom.is_empty() && uom_id.is_none() {
        errors.push(format!("Unknown UOM: \"{}\"", uom));
    }

    ValidatedRow {
        line: row.line,
        name,
        code: row.get("code").to_string(),
        description: row.get("description").to_string(),
        category,
        uom,
        category_id,
        uom_id,
        errors,
    }
}

/// Проверяет все строки; каждая попадает ровно в один из двух списков
pub fn validate_rows(rows: &[RawRow], references: &ReferenceData) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    for row in rows {
        let validated = validate_row(row, references);
        if validated.is_valid() {
            outcome.valid.push(validated);
        } else {
            outcome.invalid.push(validated);
        }
    }
    outcome
}

/// Запись на создание для корректной строки; пустые поля уходят как `null`
pub fn to_create_request(row: &ValidatedRow) -> CreateItemRequest {
    CreateItemRequest {
        name: row.name.clone(),
        code: non_empty(&row.code),
        description: non_empty(&row.description),
        category_id: row.category_id,
        default_uom_id: row.uom_id,
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
