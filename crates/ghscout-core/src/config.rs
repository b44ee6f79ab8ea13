use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const API_BASE_ENV: &str = "GHSCOUT_API_BASE";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GhscoutConfig {
    pub version: u32,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
}

/// Bearer credential. Never printed through `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Everything the lookup client needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSettings {
    pub api_base: String,
    pub credential: Option<Credential>,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            credential: None,
        }
    }
}

impl LookupSettings {
    pub fn resolve(
        config: Option<&GhscoutConfig>,
        api_base_override: Option<String>,
        token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let configured = config.and_then(|value| value.api.base_url.clone());
        let api_base = match api_base_override.or(configured) {
            Some(value) => normalize_api_base(&value)?,
            None => DEFAULT_API_BASE.to_string(),
        };

        Ok(Self {
            api_base,
            credential: token.and_then(Credential::new),
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve home directory for config path")]
    HomeDirectoryUnavailable,
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {message}")]
    Validation { message: String },
}

pub fn resolve_config_path() -> Result<PathBuf, ConfigError> {
    let base_dirs = BaseDirs::new().ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(base_dirs
        .home_dir()
        .join(".config")
        .join("ghscout")
        .join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<GhscoutConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: GhscoutConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&parsed)?;
    Ok(parsed)
}

pub fn load_optional_config(path: &Path) -> Result<Option<GhscoutConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    load_config(path).map(Some)
}

/// Reads the config file (if any) and the process environment. Called once per run.
pub fn load_settings() -> Result<LookupSettings, ConfigError> {
    let path = resolve_config_path()?;
    let config = load_optional_config(&path)?;
    LookupSettings::resolve(
        config.as_ref(),
        non_empty_env(API_BASE_ENV),
        non_empty_env(TOKEN_ENV),
    )
}

pub fn validate_config(config: &GhscoutConfig) -> Result<(), ConfigError> {
    if config.version != 1 {
        return Err(ConfigError::Validation {
            message: "version must be 1".to_string(),
        });
    }

    if let Some(base_url) = &config.api.base_url {
        normalize_api_base(base_url)?;
    }

    Ok(())
}

pub fn normalize_api_base(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Validation {
            message: "api.base_url must be non-empty".to_string(),
        });
    }

    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ConfigError::Validation {
            message: format!("api.base_url must start with http:// or https://, got '{trimmed}'"),
        });
    }

    Ok(trimmed.to_string())
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
