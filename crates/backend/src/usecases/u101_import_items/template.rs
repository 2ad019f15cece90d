use anyhow::Result;

/// Канонический заголовок файла импорта
pub const TEMPLATE_HEADERS: [&str; 5] = ["name", "code", "description", "category", "uom"];

/// Имя файла шаблона для скачивания
pub const TEMPLATE_FILE_NAME: &str = "items_import_template.csv";

const TEMPLATE_EXAMPLES: [[&str; 5]; 3] = [
    [
        "Ballpoint Pen",
        "PEN-001",
        "Blue ink ballpoint pen",
        "Office Supplies",
        "EA",
    ],
    [
        "Printer Paper A4",
        "PAP-A4",
        "80gsm white copy paper, 500 sheets",
        "Office Supplies",
        "PKT",
    ],
    ["Hand Sanitizer", "", "500ml pump bottle", "Cleaning", "EA"],
];

/// Формирует CSV шаблона: заголовок и три строки-примера
pub fn template_csv() -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(TEMPLATE_HEADERS)?;
    for example in TEMPLATE_EXAMPLES {
        writer.write_record(example)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush template: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::super::{csv_tokenizer::tokenize, row_normalizer::normalize};
    use super::*;

    #[test]
    fn test_template_header_and_rows() {
        let text = template_csv().unwrap();
        assert!(text.starts_with("name,code,description,category,uom\n"));

        let table = tokenize(&text).unwrap();
        assert_eq!(table.headers, TEMPLATE_HEADERS.to_vec());
        assert_eq!(table.records.len(), 3);
    }

    #[test]
    fn test_template_is_importable() {
        let rows = normalize(&tokenize(&template_csv().unwrap()).unwrap()).unwrap();
        assert_eq!(rows[1].get("description"), "80gsm white copy paper, 500 sheets");
        assert_eq!(rows[2].get("code"), "");
    }
}
