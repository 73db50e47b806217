//! Runtime configuration: `config.toml` in the platform config directory,
//! then `ORDERLY_*` environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen3:8b";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

const ENV_ENDPOINT: &str = "ORDERLY_OLLAMA_ENDPOINT";
const ENV_MODEL: &str = "ORDERLY_MODEL";
const ENV_TIMEOUT: &str = "ORDERLY_TIMEOUT_SECS";

/// Connection settings for the local inference service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OllamaConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.timeout_seconds == 0 {
            return Err(AppError::Config(
                "timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ollama: OllamaConfig,
    /// Where the pending undo batch is kept between runs.
    pub undo_file: Option<PathBuf>,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "orderly")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn default_undo_file() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("last_undo.json"))
        .unwrap_or_else(|| PathBuf::from(".orderly_last_undo.json"))
}

impl AppConfig {
    /// Loads the config file if present (an explicit `path` must exist) and
    /// applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(explicit) => Self::from_file(explicit)?,
            None => match default_config_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&raw)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(raw: &str) -> Result<Self, AppError> {
        let config: Self = toml::from_str(raw).map_err(|e| AppError::Config(e.to_string()))?;
        config.ollama.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), AppError> {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            self.ollama.endpoint = endpoint;
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            self.ollama.model = model;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT) {
            self.ollama.timeout_seconds = timeout.trim().parse().map_err(|_| {
                AppError::Config(format!("{ENV_TIMEOUT} must be a number of seconds"))
            })?;
        }
        self.ollama.validate()
    }

    pub fn undo_file(&self) -> PathBuf {
        self.undo_file.clone().unwrap_or_else(default_undo_file)
    }
}
