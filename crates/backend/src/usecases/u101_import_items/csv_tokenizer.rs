use csv::{ReaderBuilder, Trim};

use super::error::ImportError;

/// Одна непустая строка файла
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    /// Номер строки в файле, начиная с 1
    pub line: usize,
    pub fields: Vec<String>,
}

/// Результат разбора: заголовки и строки данных
#[derive(Debug, Clone)]
pub struct CsvTable {
    /// Заголовки в нижнем регистре, без пробелов по краям
    pub headers: Vec<String>,
    pub records: Vec<CsvRecord>,
}

/// Разбирает текст CSV на заголовок и строки данных.
///
/// Кавычки, экранирование `""` и переводы строк `\n` / `\r\n` обрабатывает
/// `csv`. Полностью пустые строки (все поля пустые после trim) пропускаются.
pub fn tokenize(content: &str) -> Result<CsvTable, ImportError> {
    // Excel добавляет BOM в начало UTF-8 файлов
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut lines = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ImportError::Parse(e.to_string()))?;

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(lines.len() + 1);

        lines.push(CsvRecord {
            line,
            fields: record.iter().map(str::to_string).collect(),
        });
    }

    if lines.len() < 2 {
        return Err(ImportError::Parse(
            "CSV file must contain a header row and at least one data row".to_string(),
        ));
    }

    let mut lines = lines.into_iter();
    let headers = lines
        .next()
        .map(|header| {
            header
                .fields
                .iter()
                .map(|h| h.trim().to_lowercase())
                .collect()
        })
        .unwrap_or_default();

    Ok(CsvTable {
        headers,
        records: lines.collect(),
    })
}

/// Декодирует содержимое загруженного файла
pub fn decode_utf8(bytes: &[u8]) -> Result<&str, ImportError> {
    std::str::from_utf8(bytes)
        .map_err(|e| ImportError::Parse(format!("file is not valid UTF-8 text ({})", e)))
}
