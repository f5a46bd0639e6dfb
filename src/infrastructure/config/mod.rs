use std::path::PathBuf;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upload_dir: PathBuf,
    pub llm: LLMConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upload_dir: PathBuf::from("uploads"),
            llm: LLMConfig::default(),
        }
    }
}

impl AppConfig {
    /// Merge `insighta.toml` with `INSIGHTA_`-prefixed environment variables
    /// (double underscore for nesting, e.g. `INSIGHTA_SERVER__PORT`). The
    /// `GEMINI_API_KEY` and `PORT` variables keep working as the deployment
    /// conventions they already are; both are resolved here, once, so the
    /// rest of the crate never reads the environment.
    pub fn load() -> Result<AppConfig> {
        let mut config: AppConfig = Figment::new()
            .merge(Toml::file("insighta.toml"))
            .merge(Env::prefixed("INSIGHTA_").split("__"))
            .extract()
            .map_err(|e| AppError::Internal(format!("invalid configuration: {}", e)))?;

        if !config.llm.has_credentials() {
            config.llm.api_key = std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                config.server.port = port;
            }
        }

        Ok(config)
    }
}
