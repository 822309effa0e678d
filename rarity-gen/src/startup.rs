//! Process startup: logging first, then configuration

use crate::logging::{init_tracing, LogHandle};
use anyhow::Result;
use rarity_common::config::{ConfigOverrides, RarityConfig};
use std::path::Path;

/// Level used until the configured one is known
pub const BOOT_LOG_LEVEL: &str = "info";

/// Install logging, resolve the configuration, then switch logging to the
/// configured level and file.
///
/// Warnings raised while reading `.env` or the TOML file reach the boot
/// subscriber on stderr.
pub fn start(
    overrides: &ConfigOverrides,
    config_path: Option<&Path>,
) -> Result<(RarityConfig, LogHandle)> {
    let boot_level = overrides.log_level.as_deref().unwrap_or(BOOT_LOG_LEVEL);
    let logging = init_tracing(boot_level)?;

    let config = RarityConfig::load(overrides, config_path)?;
    logging.apply(&config.log_level, config.log_file.as_deref())?;

    Ok((config, logging))
}
