use std::path::PathBuf;

/// Process-level settings read from the environment (and `.env`).
pub struct Config {
    pub log_format: String,
    /// Engine configuration file; `--config` takes precedence
    pub engine_config_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let log_format = std::env::var("SF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
        let engine_config_path = std::env::var("SF_CONFIG")
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self {
            log_format,
            engine_config_path,
        }
    }
}
