//! Configuration module.
//!
//! Handles loading and validating `facepool.toml`. The file is optional: by
//! default it is looked up next to the face document, and every key has a
//! default.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [ordering]
//! base = 1000               # Spacing of generated order values
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! sequential = false        # Run image I/O on the calling thread
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::document::DecodeOptions;
use crate::order::{DEFAULT_ORDER_BASE, OrderPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up next to a face document.
pub const CONFIG_FILE_NAME: &str = "facepool.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `facepool.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FacepoolConfig {
    /// Default ordering of unordered categories and faces.
    pub ordering: OrderingConfig,
    /// Bulk image I/O settings.
    pub processing: ProcessingConfig,
}

impl FacepoolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ordering.base <= 0 {
            return Err(ConfigError::Validation(
                "ordering.base must be positive".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn order_policy(&self) -> OrderPolicy {
        OrderPolicy::new(self.ordering.base)
    }

    /// Decode options for documents handled under this config.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            policy: self.order_policy(),
            ..DecodeOptions::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderingConfig {
    /// Quantum for generated order values. Must be positive.
    pub base: i64,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            base: DEFAULT_ORDER_BASE,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
    /// Skip the worker pool and run image I/O on the calling thread.
    pub sequential: bool,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<FacepoolConfig, ConfigError> {
    let config: FacepoolConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<FacepoolConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load `facepool.toml` from `dir`, falling back to defaults when absent.
pub fn load_config(dir: &Path) -> Result<FacepoolConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(FacepoolConfig::default());
    }
    load_config_file(&path)
}

/// Returns a fully-commented stock `facepool.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# facepool configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# The file is read from next to the face document (facepool.toml) unless
# --config points somewhere else. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Ordering
# ---------------------------------------------------------------------------
# Categories and faces added without an explicit "order" are placed one
# block after the previously added sibling. The first one stays unset
# (sorts as 0), the next ones get 1000, 2000, ...
# Leaving gaps lets you slot entries in by hand (e.g. 1500) later.
[ordering]
base = 1000

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for reading and writing images.
# Omit to use all CPU cores. Larger values are clamped to the core count.
# max_processes = 4

# Read and write images one at a time on the main thread.
sequential = false
"##
}
