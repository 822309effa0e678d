//! Configuration loading
//!
//! Every setting resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (a `.env` file in the working directory is loaded first)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The input file has no compiled default and must come from one of the
//! first three tiers.

use crate::links::DEFAULT_IPFS_GATEWAY;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Output file stem when nothing else is configured
pub const DEFAULT_FILE_NAME: &str = "nft-data";

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

pub const ENV_INPUT: &str = "RARITY_INPUT";
pub const ENV_OUTPUT_DIR: &str = "RARITY_OUTPUT_DIR";
pub const ENV_FILE_NAME: &str = "FILE_NAME";
pub const ENV_IPFS_GATEWAY: &str = "RARITY_IPFS_GATEWAY";
pub const ENV_FETCH_TIMEOUT: &str = "RARITY_FETCH_TIMEOUT_SECS";

/// Settings read from the TOML config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Collection file (JSON array of token documents)
    #[serde(default)]
    pub input: Option<PathBuf>,

    /// Directory the report is written to
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Report file stem (`<file_name>.json`)
    #[serde(default)]
    pub file_name: Option<String>,

    #[serde(default)]
    pub ipfs_gateway: Option<String>,

    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values given on the command line; `None` defers to lower tiers
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub file_name: Option<String>,
    pub ipfs_gateway: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

/// Fully resolved run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RarityConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub file_name: String,
    pub ipfs_gateway: String,
    pub fetch_timeout: Duration,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl RarityConfig {
    /// Load `.env`, read the TOML file and resolve every setting.
    ///
    /// `config_path` defaults to [`default_config_path`].
    pub fn load(overrides: &ConfigOverrides, config_path: Option<&Path>) -> Result<Self> {
        load_dotenv();

        let toml_config = match config_path
            .map(Path::to_path_buf)
            .or_else(default_config_path)
        {
            Some(path) => load_toml_config(&path)?,
            None => {
                warn!("Could not determine config directory, using defaults");
                TomlConfig::default()
            }
        };

        resolve(overrides, &toml_config)
    }

    /// Path of the report file
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.json", self.file_name))
    }
}

/// Resolve every setting from CLI overrides, environment, TOML and defaults
pub fn resolve(overrides: &ConfigOverrides, toml_config: &TomlConfig) -> Result<RarityConfig> {
    let input = overrides
        .input
        .clone()
        .or_else(|| env_value(ENV_INPUT).map(PathBuf::from))
        .or_else(|| toml_config.input.clone())
        .ok_or_else(|| {
            Error::Config(format!(
                "No input file configured. Pass --input, set {}, or add `input = \"...\"` to the config file",
                ENV_INPUT
            ))
        })?;

    let output_dir = overrides
        .output_dir
        .clone()
        .or_else(|| env_value(ENV_OUTPUT_DIR).map(PathBuf::from))
        .or_else(|| toml_config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let file_name = overrides
        .file_name
        .clone()
        .or_else(|| env_value(ENV_FILE_NAME))
        .or_else(|| toml_config.file_name.clone())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

    let ipfs_gateway = overrides
        .ipfs_gateway
        .clone()
        .or_else(|| env_value(ENV_IPFS_GATEWAY))
        .or_else(|| toml_config.ipfs_gateway.clone())
        .unwrap_or_else(|| DEFAULT_IPFS_GATEWAY.to_string());

    let env_timeout = match env_value(ENV_FETCH_TIMEOUT) {
        Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
            Error::Config(format!("Invalid {} '{}': {}", ENV_FETCH_TIMEOUT, raw, e))
        })?),
        None => None,
    };
    let fetch_timeout_secs = overrides
        .fetch_timeout_secs
        .or(env_timeout)
        .or(toml_config.fetch_timeout_secs)
        .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);

    let log_level = overrides
        .log_level
        .clone()
        .unwrap_or_else(|| toml_config.logging.level.clone());

    let config = RarityConfig {
        input,
        output_dir,
        file_name,
        ipfs_gateway,
        fetch_timeout: Duration::from_secs(fetch_timeout_secs),
        log_level,
        log_file: toml_config.logging.file.clone(),
    };

    debug!(?config, "Configuration resolved");
    Ok(config)
}

/// Read a TOML config file.
///
/// A missing file is not an error: a warning is logged and defaults apply.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Config file not found: {} (using defaults)", path.display());
            return Ok(TomlConfig::default());
        }
        Err(e) => return Err(Error::Io(e)),
    };

    let config = toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e))
    })?;

    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Write a TOML config file via a temp file and rename
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

/// `<config_dir>/rarity-gen/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rarity-gen").join("config.toml"))
}

/// Load `.env` from the working directory or its parents, if present
pub fn load_dotenv() {
    if let Ok(path) = dotenv::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
