//! Configuration management for sourcedeck
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{CONFIG_GENERATED, DEFAULT_ROWS_PER_PAGE, ROWS_PER_PAGE_OPTIONS};
use crate::ui::components::columns::ColumnId;
use crate::utils::coords::CoordinateFormat;
use crate::utils::datetime;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub table: TableConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL that relative API endpoints are resolved against
    pub base_url: String,
    /// Environment variable holding the API token
    pub token_env: String,
}

/// Source table settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Initial rows per page (one of 10, 25, 50, 100)
    pub rows_per_page: u32,
    /// "sexagesimal" or "decimal"
    pub coordinate_format: CoordinateFormat,
    /// Columns hidden on startup, by config name (e.g. "redshift")
    pub hidden_columns: Vec<String>,
    /// Group whose view is opened on startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_group: Option<i64>,
    /// Only consider classifications visible to the active group
    pub classifications_in_group_only: bool,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Date format for absolute timestamps
    pub date_format: String,
    /// Time format for absolute timestamps
    pub time_format: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write logs to a file in addition to the in-app log view
    pub enabled: bool,
    /// Minimum level written to the log file
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            token_env: "SKYPORTAL_TOKEN".to_string(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            coordinate_format: CoordinateFormat::default(),
            hidden_columns: Vec::new(),
            default_group: None,
            classifications_in_group_only: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: datetime::DATE_FORMAT.to_string(),
            time_format: "%H:%M".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from("sourcedeck.toml");
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        // 2. Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("sourcedeck").join("config.toml");
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Err(e) = url::Url::parse(&self.api.base_url) {
            anyhow::bail!("Invalid base_url '{}': {}", self.api.base_url, e);
        }

        if self.api.token_env.is_empty() {
            anyhow::bail!("token_env cannot be empty");
        }

        if !ROWS_PER_PAGE_OPTIONS.contains(&self.table.rows_per_page) {
            anyhow::bail!(
                "rows_per_page must be one of {:?}, got {}",
                ROWS_PER_PAGE_OPTIONS,
                self.table.rows_per_page
            );
        }

        for name in &self.table.hidden_columns {
            if ColumnId::from_config_name(name).is_none() {
                anyhow::bail!("Unknown column '{}' in hidden_columns", name);
            }
        }

        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            anyhow::bail!("Invalid logging level '{}'", self.logging.level);
        }

        // Validate date/time formats
        if let Err(e) = chrono::NaiveDate::parse_from_str("2025-01-01", &self.display.date_format) {
            anyhow::bail!("Invalid date_format '{}': {}", self.display.date_format, e);
        }

        if let Err(e) = chrono::NaiveTime::parse_from_str("12:00", &self.display.time_format) {
            anyhow::bail!("Invalid time_format '{}': {}", self.display.time_format, e);
        }

        Ok(())
    }

    /// Columns visible on startup, in display order
    pub fn visible_columns(&self) -> Vec<ColumnId> {
        ColumnId::ALL
            .iter()
            .copied()
            .filter(|c| c.default_visible())
            .filter(|c| !self.table.hidden_columns.iter().any(|h| h == c.config_name()))
            .collect()
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        // Add header comment
        let header = format!(
            "# sourcedeck configuration file\n# Generated on {}\n\n",
            chrono::Local::now().format(datetime::DATE_FORMAT)
        );

        let full_content = header + &toml_content;

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        println!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join("sourcedeck"))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join("config.toml"))
    }
}
