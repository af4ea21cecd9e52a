//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.egov/config.json`) and environment.
//! The LLM credential normally comes from `GROQ_API_KEY`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Hosted LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Conversation window settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP and WebSocket (default 8080).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// OpenAI-compatible provider endpoint, model and credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    /// API base including the version segment (default Groq's OpenAI-compatible endpoint).
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model id passed as-is to the provider.
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API key. Overridden by GROQ_API_KEY env.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Upper bound for one completion call, in seconds.
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "llama-3.2-90b-text-preview".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

/// Conversation window: how many exchanges (user + assistant pairs) are kept as context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default = "default_session_window")]
    pub window: usize,
}

fn default_session_window() -> usize {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window: default_session_window(),
        }
    }
}

/// Resolve the LLM API key: env GROQ_API_KEY overrides config.
pub fn resolve_api_key(config: &Config) -> Option<String> {
    std::env::var("GROQ_API_KEY")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .llm
                .api_key
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("EGOV_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".egov").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path (or the default path). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        parse_config_file(&path)?
    };
    Ok((config, path))
}

fn parse_config_file(path: &Path) -> Result<Config> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing config from {}", path.display()))
}

/// Create the config directory and write a default `config.json` if it does not exist.
/// Returns the config directory.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;
    if !config_path.exists() {
        let body = serde_json::to_string_pretty(&Config::default())
            .context("serializing default config")?;
        std::fs::write(config_path, body)
            .with_context(|| format!("writing {}", config_path.display()))?;
        log::info!("wrote default config to {}", config_path.display());
    }
    Ok(config_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let c = Config::default();
        assert_eq!(c.gateway.port, 8080);
        assert_eq!(c.gateway.bind, "127.0.0.1");
        assert_eq!(c.session.window, 10);
        assert_eq!(c.llm.model, "llama-3.2-90b-text-preview");
        assert_eq!(c.llm.timeout_secs, 60);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: Config = serde_json::from_str(r#"{"gateway":{"port":9000},"llm":{"timeoutSecs":5}}"#)
            .unwrap();
        assert_eq!(c.gateway.port, 9000);
        assert_eq!(c.gateway.bind, "127.0.0.1");
        assert_eq!(c.llm.timeout_secs, 5);
        assert_eq!(c.llm.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(c.session.window, 10);
    }

    #[test]
    fn init_writes_loadable_default_config() {
        let dir = std::env::temp_dir().join(format!("egov-config-test-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.json");
        let returned = init_config_dir(&path).unwrap();
        assert_eq!(returned, dir);
        let (config, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert_eq!(config.gateway.port, 8080);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join(format!("egov-missing-{}.json", uuid::Uuid::new_v4()));
        let (config, _) = load_config(Some(path)).unwrap();
        assert_eq!(config.session.window, 10);
    }
}
