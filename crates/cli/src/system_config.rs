//! System-wide configuration
//!
//! Stored as TOML in the user's config directory. Every field has a default,
//! so a missing file or a partial file is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "deathlink-counter";
const CONFIG_FILE: &str = "config.toml";

/// Default multiworld server port
pub const DEFAULT_PORT: u16 = 38281;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Quiet period before the running count is logged
    pub debounce_secs: f64,
    /// Log one line per death as it arrives
    pub echo_deaths: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            debounce_secs: 5.0,
            echo_deaths: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Port used when the address does not name one
    pub default_port: u16,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            default_port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Also write logs to this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub reporter: ReporterConfig,
    pub connection: ConnectionConfig,
    pub logging: LoggingConfig,
}

impl SystemConfig {
    /// Check that every value is in its valid range
    pub fn validate(&self) -> Result<()> {
        let debounce = self.reporter.debounce_secs;
        if !(0.1..=3600.0).contains(&debounce) {
            anyhow::bail!("reporter.debounce_secs must be between 0.1 and 3600 (got {})", debounce);
        }
        if self.connection.default_port == 0 {
            anyhow::bail!("connection.default_port must be between 1 and 65535");
        }
        tracing_subscriber::EnvFilter::try_new(&self.logging.level)
            .with_context(|| format!("logging.level is not a valid filter: {}", self.logging.level))?;
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_secs_f64(self.reporter.debounce_secs)
    }
}

/// Location of the config file, if the platform has a config directory
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load the config file, falling back to defaults when it does not exist
pub fn load() -> Result<SystemConfig> {
    match config_file_path() {
        Some(path) => load_from(&path),
        None => Ok(SystemConfig::default()),
    }
}

pub fn load_from(path: &Path) -> Result<SystemConfig> {
    if !path.exists() {
        return Ok(SystemConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}

pub fn save_to(config: &SystemConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let serialized = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, serialized)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}

pub fn example_config() -> &'static str {
    r#"# Death Link counter configuration

[reporter]
# Seconds without a new death before the running count is logged (0.1 - 3600)
debounce_secs = 5.0
# Log every death as it arrives
echo_deaths = true

[connection]
# Port used when the server address has none
default_port = 38281

[logging]
# Log filter, e.g. "info" or "session=debug,info". RUST_LOG takes precedence.
level = "info"
# Optional log file
# file = "/tmp/deathlink-counter.log"
"#
}
