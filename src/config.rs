//! Configuration management for Converse
//!
//! This module handles loading, parsing, and validating configuration
//! from YAML files, with per-field defaults so a missing file or a
//! partial file still yields a working setup.

use crate::error::{ConverseError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use url::Url;

/// Main configuration structure for Converse
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Owning identity for persisted conversations. Falls back to the
    /// OS username when absent; with neither, persistence is disabled.
    #[serde(default)]
    pub owner: Option<String>,

    /// Chat-client settings (which proxy to talk to)
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Completion provider settings used by `converse serve`
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Proxy service settings used by `converse serve`
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the chat client sends its exchanges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Full URL of the proxy chat endpoint
    #[serde(default = "default_proxy_url")]
    pub url: String,
}

fn default_proxy_url() -> String {
    "http://127.0.0.1:8787/chat".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            url: default_proxy_url(),
        }
    }
}

/// Completion provider configuration
///
/// Output length and sampling temperature are fixed per deployment here,
/// not negotiated per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model identifier to request
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key. The key is
    /// read per request; a missing key fails that request only.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Maximum completion length in tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Proxy service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the proxy binds to
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// A missing file yields the default configuration; a present but
    /// malformed file is an error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use converse::config::Config;
    ///
    /// let config = Config::load("config/config.yaml").unwrap();
    /// config.validate().unwrap();
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConverseError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: Config = serde_yaml::from_str(&contents)
            .map_err(|e| ConverseError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConverseError::Config` describing the first invalid field
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.proxy.url)
            .map_err(|e| ConverseError::Config(format!("Invalid proxy url: {}", e)))?;

        Url::parse(&self.provider.api_base)
            .map_err(|e| ConverseError::Config(format!("Invalid provider api_base: {}", e)))?;

        if self.provider.model.trim().is_empty() {
            return Err(ConverseError::Config("Provider model must not be empty".into()).into());
        }

        if self.provider.api_key_env.trim().is_empty() {
            return Err(
                ConverseError::Config("Provider api_key_env must not be empty".into()).into(),
            );
        }

        if self.provider.max_tokens == 0 {
            return Err(
                ConverseError::Config("Provider max_tokens must be greater than zero".into())
                    .into(),
            );
        }

        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConverseError::Config(
                "Provider temperature must be between 0.0 and 2.0".into(),
            )
            .into());
        }

        self.server
            .bind
            .parse::<SocketAddr>()
            .map_err(|e| ConverseError::Config(format!("Invalid server bind address: {}", e)))?;

        Ok(())
    }

    /// Resolve the owning identity for persistence
    ///
    /// Precedence: explicit override (CLI), configured owner, then the
    /// OS username. None disables persistence.
    pub fn resolve_owner(&self, override_owner: Option<String>) -> Option<String> {
        override_owner
            .or_else(|| self.owner.clone())
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .filter(|owner| !owner.trim().is_empty())
    }
}
