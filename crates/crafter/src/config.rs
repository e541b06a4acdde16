//! crafter.toml loading.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crafter_client::{ApiKey, ClientConfig, RetryPolicy, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crafter_core::SessionOptions;
use crafter_server::ServerConfig;

/// Configuration file structure (crafter.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub preview: SessionOptions,
}

#[derive(Debug, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_open")]
    pub open: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            open: default_open(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    2000
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    7878
}
fn default_open() -> bool {
    true
}

impl GenerationSettings {
    /// Build the client config, reading the API key through `lookup`.
    pub fn client_config_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<ClientConfig> {
        let key = lookup(&self.api_key_env)
            .filter(|k| !k.trim().is_empty())
            .with_context(|| format!("Missing API key: set the {} environment variable", self.api_key_env))?;

        Ok(ClientConfig {
            api_key: ApiKey::new(key),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            retry: RetryPolicy {
                max_attempts: self.max_attempts.max(1),
                base_delay: Duration::from_millis(self.base_delay_ms),
            },
        })
    }

    /// Build the client config from the process environment.
    pub fn client_config(&self) -> Result<ClientConfig> {
        self.client_config_with(|name| std::env::var(name).ok())
    }
}

impl ServerSettings {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            open: self.open,
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }

    tracing::debug!("No config at {}, using defaults", path.display());
    Ok(ConfigFile::default())
}
