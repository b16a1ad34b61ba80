use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File};
use std::time::Duration;

use knowledge_base::scope::clamp_interval;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/knowledge-base";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub polling: PollingSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Variável de ambiente consultada a cada requisição quando não há token fixo
    pub token_env: String,
    /// Token fixo (KB_API_TOKEN ou --token)
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PollingSettings {
    pub interval_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.timeout_secs", 30)?
            .set_default("api.connect_timeout_secs", 5)?
            .set_default("api.token_env", "KB_API_TOKEN")?
            .set_default("polling.interval_secs", 30)?
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // CRM_KB__API__BASE_URL, CRM_KB__POLLING__INTERVAL_SECS, ...
            .add_source(Environment::with_prefix("CRM_KB").separator("__"));

        // Variáveis de ambiente específicas têm prioridade
        if let Ok(base_url) = std::env::var("KB_API_BASE_URL") {
            builder = builder.set_override("api.base_url", base_url)?;
        }
        if let Ok(token) = std::env::var("KB_API_TOKEN") {
            if !token.trim().is_empty() {
                builder = builder.set_override("api.token", token)?;
            }
        }

        let s = builder.build()?;

        s.try_deserialize()
    }

    /// Intervalo de polling dentro dos limites aceitos
    pub fn poll_interval(&self) -> Duration {
        clamp_interval(Duration::from_secs(self.polling.interval_secs))
    }
}
