//! Tracing subscriber setup
//!
//! The subscriber is installed before configuration is read, so warnings
//! raised while loading config are not lost. Once the config is resolved,
//! [`LogHandle::apply`] swaps in the configured level and log file.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

static LOG_HANDLE: OnceLock<LogHandle> = OnceLock::new();

/// Control over the installed subscriber
#[derive(Clone)]
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    file: Arc<Mutex<Option<File>>>,
    env_override: bool,
}

impl LogHandle {
    /// Switch to `level` (unless `RUST_LOG` is set) and to `file`, or back to stderr
    pub fn apply(&self, level: &str, file: Option<&Path>) -> Result<()> {
        if !self.env_override {
            let filter = EnvFilter::try_new(level)
                .with_context(|| format!("Invalid log level '{}'", level))?;
            self.filter
                .reload(filter)
                .context("Failed to update log filter")?;
        }

        let target = match file {
            Some(path) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file {}", path.display()))?,
            ),
            None => None,
        };
        *lock_file(&self.file) = target;
        Ok(())
    }
}

/// Install the global subscriber, or return the one already installed.
///
/// `RUST_LOG` takes precedence over `level`. Output goes to stderr until
/// [`LogHandle::apply`] names a file.
pub fn init_tracing(level: &str) -> Result<LogHandle> {
    if let Some(handle) = LOG_HANDLE.get() {
        return Ok(handle.clone());
    }

    let (filter, env_override) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (
            EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{}'", level))?,
            false,
        ),
    };
    let (filter_layer, filter_handle) = reload::Layer::new(filter);

    let file = Arc::new(Mutex::new(None));
    let writer = LogWriter { file: file.clone() };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(writer),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    let handle = LogHandle {
        filter: filter_handle,
        file,
        env_override,
    };
    Ok(LOG_HANDLE.get_or_init(|| handle).clone())
}

fn lock_file(file: &Mutex<Option<File>>) -> MutexGuard<'_, Option<File>> {
    file.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Writes to the configured log file, or stderr when there is none
#[derive(Clone)]
struct LogWriter {
    file: Arc<Mutex<Option<File>>>,
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match lock_file(&self.file).as_mut() {
            Some(file) => file.write(buf),
            None => std::io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match lock_file(&self.file).as_mut() {
            Some(file) => file.flush(),
            None => std::io::stderr().flush(),
        }
    }
}
