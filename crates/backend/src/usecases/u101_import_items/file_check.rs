use super::error::ImportError;

/// Лимит размера файла по умолчанию - 5 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Ограничения на выбираемый файл
#[derive(Debug, Clone, Copy)]
pub struct FileLimits {
    pub max_file_size: u64,
}

impl Default for FileLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Проверяет выбранный файл до разбора: расширение `.csv` и размер
pub fn check_selected_file(
    file_name: &str,
    size: u64,
    limits: &FileLimits,
) -> Result<(), ImportError> {
    if !file_name.to_ascii_lowercase().ends_with(".csv") {
        return Err(ImportError::InvalidFileType(file_name.to_string()));
    }

    if size > limits.max_file_size {
        return Err(ImportError::file_too_large(size, limits.max_file_size));
    }

    Ok(())
}
