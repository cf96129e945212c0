//! src/config.rs

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_SUMMARY_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 300;
pub const DEFAULT_DESCRIPTION_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_DESCRIPTION_MAX_TOKENS: u32 = 400;
pub const DEFAULT_MAX_DIFF_TOKENS: usize = 12_000;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Represents the main configuration for the application.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// API endpoint and credential.
    #[serde(default)]
    pub openai: OpenAIConfig,
    /// Model selection and token limits.
    #[serde(default)]
    pub ai: AIConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OpenAIConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of the API, without the `/chat/completions` suffix.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AIConfig {
    #[serde(default = "default_summary_model")]
    pub summary_model: String,
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,
    #[serde(default = "default_description_model")]
    pub description_model: String,
    #[serde(default = "default_description_max_tokens")]
    pub description_max_tokens: u32,
    /// Diffs estimated above this many tokens are truncated before sending.
    #[serde(default = "default_max_diff_tokens")]
    pub max_diff_tokens: usize,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            summary_model: default_summary_model(),
            summary_max_tokens: default_summary_max_tokens(),
            description_model: default_description_model(),
            description_max_tokens: default_description_max_tokens(),
            max_diff_tokens: default_max_diff_tokens(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}
fn default_summary_model() -> String {
    DEFAULT_SUMMARY_MODEL.to_string()
}
fn default_summary_max_tokens() -> u32 {
    DEFAULT_SUMMARY_MAX_TOKENS
}
fn default_description_model() -> String {
    DEFAULT_DESCRIPTION_MODEL.to_string()
}
fn default_description_max_tokens() -> u32 {
    DEFAULT_DESCRIPTION_MAX_TOKENS
}
fn default_max_diff_tokens() -> usize {
    DEFAULT_MAX_DIFF_TOKENS
}

impl Config {
    /// Applies `OPENAI_API_KEY` / `OPENAI_API_URL` style overrides. Blank values are ignored.
    pub fn with_overrides(mut self, api_key: Option<String>, api_base: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.openai.api_key = Some(key.trim().to_string());
        }
        if let Some(base) = api_base.filter(|b| !b.trim().is_empty()) {
            self.openai.api_base = base.trim().to_string();
        }
        self
    }

    /// The configured key, if it is non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.openai
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Returns the configuration directory (`<config dir>/gitai`).
///
/// `GITAI_CONFIG_DIR` replaces the whole path when set.
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = env::var_os("GITAI_CONFIG_DIR").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|p| p.join("gitai"))
        .ok_or(ConfigError::NoConfigDir)
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Loads defaults, the config file (if any), `GITAI_*` variables and the OpenAI env overrides.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = get_config_path()?;
    log::debug!("Loading configuration from {}", path.display());

    let settings = ::config::Config::builder()
        .add_source(
            ::config::File::from(path.as_path())
                .format(::config::FileFormat::Toml)
                .required(false),
        )
        .add_source(
            ::config::Environment::with_prefix("GITAI")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    Ok(config.with_overrides(
        env::var("OPENAI_API_KEY").ok(),
        env::var("OPENAI_API_URL").ok(),
    ))
}

/// Reads only what is stored on disk, so that saving does not persist environment overrides.
pub fn read_stored_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Writes the configuration file, creating its directory. The file holds a credential, so it is
/// made readable by the owner only.
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let write_err = |source: std::io::Error| ConfigError::Write {
        path: path.display().to_string(),
        source,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(write_err)?;
    }
    let content = toml::to_string_pretty(config)?;
    let mut file = open_owner_only(path).map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)?;

    log::debug!("Wrote configuration to {}", path.display());
    Ok(())
}

/// Opens `path` for writing with mode 0600. A file left with wider permissions is truncated and
/// narrowed before anything is written to it.
#[cfg(unix)]
fn open_owner_only(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_owner_only(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
