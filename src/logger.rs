use anyhow::{Context, Result};
use chrono::Utc;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::LoggingConfig;

/// Target for entries added through [`Logger::log`], which are already in
/// the history and only need to reach the log file
const HISTORY_TARGET: &str = "sourcedeck::history";

/// Shared logger that can be used across the application.
///
/// Keeps an in-memory history for the logs dialog. Once [`Logger::install`]
/// has run, every `log` record from the crate that passes the level filter
/// lands in that history too, and optionally in a log file.
#[derive(Clone)]
pub struct Logger {
    logs: Arc<Mutex<Vec<String>>>,
    installed: Arc<AtomicBool>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            logs: Arc::new(Mutex::new(Vec::new())),
            installed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a logger and route the `log` facade through it
    pub fn from_config(config: &LoggingConfig) -> Result<Self> {
        let logger = Self::new();
        let level: LevelFilter = config
            .level
            .parse()
            .with_context(|| format!("Invalid logging level '{}'", config.level))?;
        let file = if config.enabled {
            Some(Self::get_log_file_path()?)
        } else {
            None
        };
        logger.install(level, file.as_deref())?;
        Ok(logger)
    }

    /// Register as the global `log` backend, optionally mirroring to `file`
    pub fn install(&self, level: LevelFilter, file: Option<&Path>) -> Result<()> {
        let buffer = self.clone();
        let mut dispatch = fern::Dispatch::new()
            .level(LevelFilter::Warn)
            .level_for("sourcedeck", level)
            .chain(
                fern::Dispatch::new()
                    .filter(|metadata| metadata.target() != HISTORY_TARGET)
                    .chain(fern::Output::call(move |record| {
                        buffer.push(format!("{} {}", record.level(), record.args()));
                    })),
            );

        if let Some(path) = file {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
            }
            let file_output = fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} {:<5} [{}] {}",
                        Utc::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .chain(
                    fern::log_file(path)
                        .with_context(|| format!("Failed to open log file: {}", path.display()))?,
                );
            dispatch = dispatch.chain(file_output);
        }

        dispatch.apply().context("Failed to install logger")?;
        self.installed.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    /// Add a log entry, whatever the configured level
    pub fn log(&self, message: String) {
        if self.is_installed() {
            log::info!(target: HISTORY_TARGET, "{}", message);
        }
        self.push(message);
    }

    fn push(&self, message: String) {
        let timestamp = Utc::now().format("%H:%M:%S%.3f").to_string();
        let formatted_message = format!("[{}] {}", timestamp, message);

        if let Ok(mut logs) = self.logs.lock() {
            logs.push(formatted_message);
        }
    }

    /// Get all logs sorted by date (newest first)
    pub fn get_logs(&self) -> Vec<String> {
        if let Ok(logs) = self.logs.lock() {
            let mut sorted_logs = logs.clone();
            sorted_logs.reverse();
            sorted_logs
        } else {
            Vec::new()
        }
    }

    /// Clear all logs
    pub fn clear(&self) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.clear();
        }
    }

    /// Location of the log file when file logging is enabled
    pub fn get_log_file_path() -> Result<PathBuf> {
        dirs::data_local_dir()
            .or_else(dirs::cache_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
            .map(|dir| dir.join("sourcedeck").join("sourcedeck.log"))
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}
