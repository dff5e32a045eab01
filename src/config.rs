//! Project configuration module.
//!
//! Handles loading, validating, and merging `breakpix.toml`. Stock defaults
//! are overridden by the optional config file in the project directory.
//!
//! ## Config File Location
//!
//! ```text
//! my-site/
//! ├── breakpix.toml            # Optional, overrides stock defaults
//! ├── src/
//! │   ├── styles.css           # Declares --breakpoint-* properties
//! │   └── assets/images/       # Source PNG/JPEG images
//! ├── .cache/images/           # Derived variants (persistent)
//! └── dist/assets/images/      # Published copy of the cache
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! images = "src/assets/images"
//! stylesheet = "src/styles.css"
//! cache = ".cache/images"
//! output = "dist/assets/images"
//!
//! [watch]
//! root = "src"
//! debounce_ms = 300
//! poll_interval_ms = 250
//!
//! [markup]
//! url_prefix = "assets/images"
//! # fallback_size = 1024
//! ```
//!
//! Relative paths are resolved against the project directory. Unknown keys
//! are rejected to catch typos early.

use crate::publish::dirs_overlap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the config file looked up in the project directory.
pub const CONFIG_FILENAME: &str = "breakpix.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `breakpix.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Where sources, stylesheet, cache and output live.
    pub paths: PathsConfig,
    /// Change detection for `breakpix watch`.
    pub watch: WatchConfig,
    /// Settings for generated `<picture>` markup.
    pub markup: MarkupConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let paths = [
            ("paths.images", &self.paths.images),
            ("paths.stylesheet", &self.paths.stylesheet),
            ("paths.cache", &self.paths.cache),
            ("paths.output", &self.paths.output),
            ("watch.root", &self.watch.root),
        ];
        for (key, value) in paths {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if dirs_overlap(Path::new(&self.paths.cache), Path::new(&self.paths.output)) {
            return Err(ConfigError::Validation(
                "paths.cache and paths.output must be separate, non-nested directories".into(),
            ));
        }
        if self.watch.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "watch.debounce_ms must be greater than 0".into(),
            ));
        }
        if self.watch.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "watch.poll_interval_ms must be greater than 0".into(),
            ));
        }
        if self.markup.fallback_size == Some(0) {
            return Err(ConfigError::Validation(
                "markup.fallback_size must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Project-relative locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Source PNG/JPEG images (not recursive).
    pub images: String,
    /// Stylesheet declaring `--breakpoint-*` custom properties.
    pub stylesheet: String,
    /// Persistent derived-asset cache.
    pub cache: String,
    /// Published copy of the cache. Cleared on every build.
    pub output: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            images: "src/assets/images".to_string(),
            stylesheet: "src/styles.css".to_string(),
            cache: ".cache/images".to_string(),
            output: "dist/assets/images".to_string(),
        }
    }
}

impl PathsConfig {
    /// Resolve every path against `project`.
    pub fn resolve(&self, project: &Path) -> ProjectPaths {
        ProjectPaths {
            images: project.join(&self.images),
            stylesheet: project.join(&self.stylesheet),
            cache: project.join(&self.cache),
            output: project.join(&self.output),
        }
    }
}

/// [`PathsConfig`] resolved against a project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub images: PathBuf,
    pub stylesheet: PathBuf,
    pub cache: PathBuf,
    pub output: PathBuf,
}

/// Watch-mode settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Directory tree polled for changes, relative to the project.
    pub root: String,
    /// Quiet period after the last change before a build starts.
    pub debounce_ms: u64,
    /// How often the tree is scanned.
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root: "src".to_string(),
            debounce_ms: 300,
            poll_interval_ms: 250,
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// `<picture>` markup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkupConfig {
    /// URL path under which the output directory is served.
    pub url_prefix: String,
    /// Size used for the `<img src>` fallback. Largest size when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_size: Option<u32>,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            url_prefix: "assets/images".to_string(),
            fallback_size: None,
        }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
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

/// Load `breakpix.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(project: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = project.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `breakpix.toml` in the project directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(project: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(project)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `breakpix.toml` with all keys.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# breakpix configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Relative paths are resolved against the directory holding this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Paths
# ---------------------------------------------------------------------------
[paths]
# Source PNG/JPEG images. Only files directly inside are used.
images = "src/assets/images"

# Stylesheet declaring breakpoints, e.g.  --breakpoint-sm: 480px;
stylesheet = "src/styles.css"

# Persistent cache of derived WebP/PNG variants. Keep it between builds.
cache = ".cache/images"

# Published copy of the cache. Cleared and recreated on every build.
output = "dist/assets/images"

# ---------------------------------------------------------------------------
# Watch mode
# ---------------------------------------------------------------------------
[watch]
# Directory tree polled for changes.
root = "src"

# Quiet period (ms) after the last change before a rebuild starts.
debounce_ms = 300

# How often (ms) the tree is scanned for changes.
poll_interval_ms = 250

# ---------------------------------------------------------------------------
# <picture> markup
# ---------------------------------------------------------------------------
[markup]
# URL path under which the output directory is served.
url_prefix = "assets/images"

# Size used for the <img src> fallback. Defaults to the largest breakpoint.
# fallback_size = 1024
"##
}
