//! Configuration loading and settings resolution
//!
//! Every setting is resolved in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or broken config file is never fatal: it is logged and the
//! remaining sources are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "RBOX_API_URL";
/// Environment variable overriding the token file location
pub const TOKEN_FILE_ENV: &str = "RBOX_TOKEN_FILE";
/// Environment variable pointing at an alternate config file
pub const CONFIG_FILE_ENV: &str = "RBOX_CONFIG";

const APP_DIR: &str = "rbox";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Backend base URL, e.g. `http://localhost:8000`
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Where the bearer token is persisted
    #[serde(default)]
    pub token_file: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Built-in fallbacks used when no other source provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub api_base_url: String,
    pub token_file: PathBuf,
    pub request_timeout: Duration,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let token_file = dirs::config_dir()
            .map(|d| d.join(APP_DIR).join("token"))
            .unwrap_or_else(|| PathBuf::from(".rbox").join("token"));

        Self {
            api_base_url: "http://localhost:8000".to_string(),
            token_file,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Fully resolved settings handed to the client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// Base URL without a trailing slash
    pub api_base_url: String,
    pub token_file: PathBuf,
    pub request_timeout: Duration,
    pub log_level: String,
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Default location of the config file for this platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Resolves settings from CLI, environment, TOML and compiled defaults
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    toml: TomlConfig,
    defaults: CompiledDefaults,
    source: ConfigSource,
}

/// What happened when looking for the config file
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Parsed successfully
    Loaded(PathBuf),
    /// No file at the resolved path
    Missing(PathBuf),
    /// File present but unreadable or invalid; defaults used instead
    Invalid(PathBuf, String),
    /// No path given and no config directory on this platform
    Unavailable,
    /// Built from an in-memory config
    Provided,
}

impl ConfigResolver {
    /// Build a resolver, loading the config file if one can be found.
    ///
    /// `config_path` comes from the command line; when absent the
    /// `RBOX_CONFIG` variable and then the platform default are tried.
    /// Nothing is logged here since this usually runs before the subscriber
    /// exists; call [`ConfigResolver::log_source`] once logging is up.
    pub fn new(config_path: Option<&Path>) -> Self {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from))
            .or_else(default_config_path);

        let (toml, source) = match path {
            Some(path) if path.exists() => match load_toml_config(&path) {
                Ok(config) => (config, ConfigSource::Loaded(path)),
                Err(e) => (TomlConfig::default(), ConfigSource::Invalid(path, e.to_string())),
            },
            Some(path) => (TomlConfig::default(), ConfigSource::Missing(path)),
            None => (TomlConfig::default(), ConfigSource::Unavailable),
        };

        Self {
            toml,
            defaults: CompiledDefaults::for_current_platform(),
            source,
        }
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Log where the configuration came from
    pub fn log_source(&self) {
        match &self.source {
            ConfigSource::Loaded(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Missing(path) => {
                debug!("No config file at {}, using defaults", path.display())
            }
            ConfigSource::Invalid(path, reason) => {
                warn!("Ignoring config file {}: {}", path.display(), reason)
            }
            ConfigSource::Unavailable => {
                debug!("No config directory on this platform, using defaults")
            }
            ConfigSource::Provided => {}
        }
    }

    /// Build a resolver around an already-loaded config
    pub fn with_toml(toml: TomlConfig) -> Self {
        Self {
            toml,
            defaults: CompiledDefaults::for_current_platform(),
            source: ConfigSource::Provided,
        }
    }

    pub fn resolve_api_base_url(&self, cli_arg: Option<&str>) -> String {
        let url = cli_arg
            .map(str::to_string)
            .or_else(|| non_empty_env(API_URL_ENV))
            .or_else(|| self.toml.api_base_url.clone())
            .unwrap_or_else(|| self.defaults.api_base_url.clone());

        url.trim_end_matches('/').to_string()
    }

    pub fn resolve_token_file(&self, cli_arg: Option<&Path>) -> PathBuf {
        cli_arg
            .map(Path::to_path_buf)
            .or_else(|| non_empty_env(TOKEN_FILE_ENV).map(PathBuf::from))
            .or_else(|| self.toml.token_file.clone())
            .unwrap_or_else(|| self.defaults.token_file.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        self.toml
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(self.defaults.request_timeout)
    }

    pub fn log_level(&self) -> &str {
        &self.toml.logging.level
    }

    /// Resolve everything at once
    pub fn resolve(&self, api_url: Option<&str>, token_file: Option<&Path>) -> ClientSettings {
        ClientSettings {
            api_base_url: self.resolve_api_base_url(api_url),
            token_file: self.resolve_token_file(token_file),
            request_timeout: self.request_timeout(),
            log_level: self.log_level().to_string(),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
