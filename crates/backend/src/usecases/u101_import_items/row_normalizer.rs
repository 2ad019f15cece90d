use super::csv_tokenizer::CsvTable;
use super::error::ImportError;

/// Обязательная колонка шаблона
pub const REQUIRED_COLUMN: &str = "name";

/// Строка файла как отображение "колонка -> значение" до проверки.
///
/// Порядок полей совпадает с порядком заголовков.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: usize,
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            fields: Vec::new(),
        }
    }

    /// Повторный заголовок перезаписывает значение, сохраняя позицию
    pub fn insert(&mut self, column: &str, value: &str) {
        let value = value.trim().to_string();
        match self.fields.iter_mut().find(|(c, _)| c == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column.to_string(), value)),
        }
    }

    /// Значение колонки или пустая строка, если колонки нет
    pub fn get(&self, column: &str) -> &str {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }
}

/// Сопоставляет поля каждой строки заголовкам по позиции.
///
/// Лишние поля отбрасываются, недостающие дают пустую строку. Отсутствие
/// колонки `name` проверяется один раз для всего файла.
pub fn normalize(table: &CsvTable) -> Result<Vec<RawRow>, ImportError> {
    if !table.headers.iter().any(|h| h == REQUIRED_COLUMN) {
        return Err(ImportError::Schema(format!(
            "Missing required column \"{}\". Please use the template format: {}",
            REQUIRED_COLUMN,
            super::template::TEMPLATE_HEADERS.join(",")
        )));
    }

    let rows = table
        .records
        .iter()
        .map(|record| {
            let mut row = RawRow::new(record.line);
            for (idx, header) in table.headers.iter().enumerate() {
                let value = record.fields.get(idx).map(String::as_str).unwrap_or("");
                row.insert(header, value);
            }
            row
        })
        .collect();

    Ok(rows)
}
