//! Service configuration.
//!
//! Settings come from an optional TOML file (`hijri_clock.toml` by default,
//! or the path in `HIJRI_CLOCK_CONFIG`) and are then overridden by
//! environment variables. A `.env` file in the working directory is loaded
//! first so local overrides do not need to be exported by hand.

use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::ingest::aladhan::ALADHAN_BASE_URL;
use crate::logging::LogLevel;

pub const DEFAULT_CONFIG_PATH: &str = "hijri_clock.toml";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub provider: ProviderConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            provider: ProviderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: ALADHAN_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: true,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl LoggingConfig {
    pub fn min_level(&self) -> Result<LogLevel, ConfigError> {
        self.level.parse().map_err(ConfigError::Invalid)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    Io(String, std::io::Error),
    /// The config file is not valid TOML for `ServiceConfig`.
    Parse(String),
    /// A value (usually an environment override) is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Cannot read config file {}: {}", path, e),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse config from TOML text. Missing keys keep their defaults.
pub fn parse_config(text: &str) -> Result<ServiceConfig, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Read the config file at `path`. A missing file yields the defaults.
pub fn load_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    if !path.exists() {
        return Ok(ServiceConfig::default());
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
    parse_config(&text)
}

/// Apply overrides from a variable lookup. Separated from `env::var` so the
/// precedence rules can be tested without touching process state.
pub fn apply_overrides<F>(mut config: ServiceConfig, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(bind) = lookup("HIJRI_CLOCK_BIND") {
        config.bind_addr = bind;
    }
    if let Some(url) = lookup("HIJRI_CLOCK_PROVIDER_URL") {
        config.provider.base_url = url;
    }
    if let Some(raw) = lookup("HIJRI_CLOCK_TIMEOUT_SECS") {
        config.provider.timeout_secs = raw.trim().parse().map_err(|_| {
            ConfigError::Invalid(format!("HIJRI_CLOCK_TIMEOUT_SECS must be a whole number, got '{}'", raw))
        })?;
    }
    if let Some(level) = lookup("HIJRI_CLOCK_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(file) = lookup("HIJRI_CLOCK_LOG_FILE") {
        config.logging.file = Some(file);
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &ServiceConfig) -> Result<(), ConfigError> {
    if config.provider.timeout_secs == 0 {
        return Err(ConfigError::Invalid("provider timeout must be at least 1 second".into()));
    }
    if config.provider.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("provider base_url must not be empty".into()));
    }
    config.logging.min_level()?;
    Ok(())
}

/// Full startup load: `.env`, then the TOML file, then environment overrides.
pub fn load() -> Result<ServiceConfig, ConfigError> {
    dotenv::dotenv().ok();
    let path = env::var("HIJRI_CLOCK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_file(Path::new(&path))?;
    apply_overrides(config, |key| env::var(key).ok())
}
