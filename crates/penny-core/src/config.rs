//! Configuration loading
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/penny/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Backend selection can additionally be overridden with `AI_BACKEND` and
//! `SEARCH_BACKEND`. Credentials only ever come from the environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::advisor::{
    SAVINGS_SEARCH_QUERY, SEARCH_MAX_RESULTS, SNIPPET_MAX_CHARS, SNIPPET_MIN_CHARS,
};
use crate::error::{Error, Result};
use crate::models::DEFAULT_CURRENCY_SYMBOL;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/penny.toml");

/// Full application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai: AiConfig,
    pub search: SearchConfig,
    pub advisor: AdvisorConfig,
    pub display: DisplayConfig,
}

/// `[ai]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// gemini, openai_compatible, ollama, mock
    pub backend: String,
    /// Text model override (backend default when unset)
    pub model: Option<String>,
    /// Vision model override (backend default when unset)
    pub vision_model: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: "gemini".to_string(),
            model: None,
            vision_model: None,
            timeout_secs: 60,
        }
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[search]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// tavily, mock
    pub backend: String,
    pub max_results: usize,
    /// Query used by the savings advisor
    pub query: String,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: "tavily".to_string(),
            max_results: SEARCH_MAX_RESULTS,
            query: SAVINGS_SEARCH_QUERY.to_string(),
            timeout_secs: 20,
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[advisor]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub snippet_min_chars: usize,
    pub snippet_max_chars: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            snippet_min_chars: SNIPPET_MIN_CHARS,
            snippet_max_chars: SNIPPET_MAX_CHARS,
        }
    }
}

/// `[display]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency_symbol: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl Config {
    /// Load from the override file if present, else the embedded default,
    /// then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::embedded()?,
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse the embedded default configuration
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    /// Load from a specific file (no environment overrides)
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config override");
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `AI_BACKEND` / `SEARCH_BACKEND` overrides
    pub fn apply_env(&mut self) {
        if let Some(backend) = env_non_empty("AI_BACKEND") {
            self.ai.backend = backend;
        }
        if let Some(backend) = env_non_empty("SEARCH_BACKEND") {
            self.search.backend = backend;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.advisor.snippet_max_chars == 0 {
            return Err(Error::Config(
                "advisor.snippet_max_chars must be greater than zero".into(),
            ));
        }
        if self.search.max_results == 0 {
            return Err(Error::Config(
                "search.max_results must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    penny_data_dir().map(|d| d.join("config.toml"))
}

/// Penny's platform data directory (~/.local/share/penny on Linux)
pub fn penny_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("penny"))
}

/// Read an environment variable, treating empty values as unset
pub(crate) fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
