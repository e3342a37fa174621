use serde::Deserialize;
use std::collections::HashMap;

const CONFIG_FILE: &str = "config/dashboard";
const ENV_PREFIX: &str = "DASHBOARD";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub data_api: DataApiSettings,
    pub storage: StorageSettings,
    pub layout: LayoutSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Path template with `${symbol}` and `${timeframe}` placeholders
    pub candlestick_path: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayoutSettings {
    pub cell_size: u32,
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from(CONFIG_FILE)
}

/// Defaults, then the optional file `name` (any format the config crate
/// knows), then `DASHBOARD__SECTION__KEY` environment variables.
pub fn load_app_config_from(name: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("data_api.base_url", "https://alpha-datalake.azurewebsites.net/api")?
        .set_default("data_api.timeout_secs", 10)?
        .set_default(
            "data_api.candlestick_path",
            "/market/candlestick/${symbol}?timeframe=${timeframe}",
        )?
        .set_default("storage.backend", "memory")?
        .set_default("storage.path", "data/dashboards.json")?
        .set_default("layout.cell_size", 100)?
        .add_source(config::File::with_name(name).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    if app_config.layout.cell_size == 0 {
        anyhow::bail!("layout.cell_size must be greater than zero");
    }
    Ok(app_config)
}

/// Replace `${name}` placeholders in a template
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_prepare_query() {
        let mut vars = HashMap::new();
        vars.insert("symbol".to_string(), "BTC".to_string());
        vars.insert("timeframe".to_string(), "4h".to_string());

        let query = "/market/candlestick/${symbol}?timeframe=${timeframe}";
        let result = prepare_query(query, &vars);

        assert_eq!(result, "/market/candlestick/BTC?timeframe=4h");
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_app_config_from("does/not/exist").unwrap();
        assert_eq!(config.layout.cell_size, 100);
        assert_eq!(config.data_api.timeout_secs, 10);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.path, "data/dashboards.json");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[storage]\nbackend = \"file\"\npath = \"/tmp/boards.json\"\n\n[data_api]\nbase_url = \"http://localhost:9000\""
        )
        .unwrap();

        let config = load_app_config_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.path, "/tmp/boards.json");
        assert_eq!(config.data_api.base_url, "http://localhost:9000");
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_zero_cell_size_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(&path, "[layout]\ncell_size = 0\n").unwrap();

        assert!(load_app_config_from(path.to_str().unwrap()).is_err());
    }
}
