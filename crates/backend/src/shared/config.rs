use serde::Deserialize;

use crate::usecases::u101_import_items::FileLimits;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub items_api: ItemsApiConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Подключение к внешнему API номенклатуры
#[derive(Debug, Deserialize, Clone)]
pub struct ItemsApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size_bytes(),
            session_ttl_hours: default_session_ttl_hours(),
        }
    }
}

impl ImportConfig {
    pub fn file_limits(&self) -> FileLimits {
        FileLimits {
            max_file_size: self.max_file_size_bytes,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_file_size_bytes() -> u64 {
    FileLimits::default().max_file_size
}

fn default_session_ttl_hours() -> i64 {
    24
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[items_api]
base_url = "http://localhost:8080"
timeout_secs = 30

[import]
max_file_size_bytes = 5242880
session_ttl_hours = 24
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.items_api.base_url.trim().is_empty() {
        anyhow::bail!("items_api.base_url must not be empty");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.items_api.base_url, "http://localhost:8080");
        assert!(config.items_api.api_key.is_none());
        assert_eq!(config.import.max_file_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.import.file_limits().max_file_size, 5 * 1024 * 1024);
        assert_eq!(config.import.session_ttl_hours, 24);
    }

    #[test]
    fn test_import_section_is_optional() {
        let config = parse_config(
            r#"
            [server]
            port = 8000

            [items_api]
            base_url = "https://erp.example.com"
            api_key = "secret"
            "#,
        )
        .unwrap();
        assert_eq!(config.items_api.timeout_secs, 30);
        assert_eq!(config.items_api.api_key.as_deref(), Some("secret"));
        assert_eq!(config.import.session_ttl_hours, 24);
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let result = parse_config(
            r#"
            [server]
            port = 8000

            [items_api]
            base_url = " "
            "#,
        );
        assert!(result.is_err());
    }
}
