//! Exporter configuration.
//!
//! Handles loading, validating, and merging `export.toml`. Stock defaults are
//! serialized to a TOML value, the user file (if any) is merged on top key by
//! key, and the result is deserialized and validated.
//!
//! Configuration only shapes the command-line tool: where archives land, how
//! hard they are compressed, how many exports run at once. Generated bundle
//! content depends on the document alone.
//!
//! ## Where It Lives
//!
//! `export.toml` is read from the config directory (`--config-dir`, default
//! the working directory). A missing file means stock defaults.
//!
//! ## Keys
//!
//! ```toml
//! # Every key may be omitted; stock values shown
//!
//! output_dir = "dist"       # Where exported archives are written
//!
//! [archive]
//! compression_level = 9     # Deflate level 1-9; 0 stores entries uncompressed
//! overwrite = true          # Replace an existing archive with the same name
//!
//! [processing]
//! max_processes = 4         # Max parallel exports (omit for auto = CPU cores)
//! ```
//!
//! A key outside this table is an error, so misspellings surface at load time.

use crate::archive::ArchiveOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "export.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Validation(String),
}

/// Exporter configuration loaded from `export.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory exported archives are written into.
    pub output_dir: String,
    pub archive: ArchiveConfig,
    pub processing: ProcessingConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: "dist".to_string(),
            archive: ArchiveConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Reject values the exporter cannot act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".into(),
            ));
        }
        if self.archive.compression_level > 9 {
            return Err(ConfigError::Validation(
                "archive.compression_level must be 0-9".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            compression_level: self.archive.compression_level,
        }
    }
}

/// Zip container settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    pub compression_level: u8,
    pub overwrite: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: 9,
            overwrite: true,
        }
    }
}

/// How many exports the CLI runs side by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of documents exported at once.
    /// When absent, defaults to the number of CPU cores.
    /// Capped at the core count.
    pub max_processes: Option<usize>,
}

/// Worker count for the export pool: all cores, or `max_processes` if lower.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Stock defaults as a TOML value, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ExportConfig::default()).expect("default config must serialize")
}

/// Deep-merge `overlay` onto `base`. Tables merge key by key; any other
/// overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read `export.toml` from `dir`, if present.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ExportConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ExportConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Stock defaults overridden by `dir/export.toml`.
pub fn load_config(dir: &Path) -> Result<ExportConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Commented stock config, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# export.toml for checklist-export
#
# Every key may be omitted; the values below are what you get by default.
# Keys not listed here are rejected.

# Directory exported archives are written into.
output_dir = "dist"

[archive]
# Deflate level: 1 = fastest, 9 = smallest. 0 stores entries uncompressed.
compression_level = 9

# Replace an existing archive with the same filename.
overwrite = true

[processing]
# Maximum documents exported in parallel. Leave unset to use every CPU core.
# max_processes = 4
"##
}
