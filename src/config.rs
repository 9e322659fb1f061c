//! Site configuration.
//!
//! A run is driven by a single [`Config`]. Values are layered, each layer
//! overriding the one before:
//!
//! ```text
//! stock defaults                 (Config::default)
//! <base-dir>/orgpress.toml       (optional)
//! command-line flags
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options except `template` are optional - defaults shown below
//!
//! base-dir = "."                       # Root for source search and output
//! input-pattern = "org$"               # Regex over absolute source paths
//! input-exclude = "^$"                 # Regex; matching sources are skipped
//! output = "output/{{ slug }}.html"    # Output path template, relative to base-dir
//! template = "post.html"               # Content template (required)
//! template-dirs = []                   # Extra template dirs (default: built-in theme)
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! The post filter ([`Config::input_filter`]) is a Rust predicate and can
//! only be set by library callers.

use crate::extract::Metadata;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// File name of the per-site config, looked up in the base directory.
pub const CONFIG_FILE: &str = "orgpress.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Predicate deciding, after extraction, whether a post gets rendered.
#[derive(Clone)]
pub struct InputFilter(Arc<dyn Fn(&Metadata) -> bool + Send + Sync>);

impl InputFilter {
    pub fn new(predicate: impl Fn(&Metadata) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    pub fn accepts(&self, metadata: &Metadata) -> bool {
        (self.0)(metadata)
    }
}

impl fmt::Debug for InputFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InputFilter(..)")
    }
}

/// Options for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// Root directory for both source search and output.
    pub base_dir: PathBuf,
    /// Regex a source path must match to be included.
    pub input_pattern: String,
    /// Regex a source path must not match.
    pub input_exclude: String,
    /// Optional post filter applied after extraction, before rendering.
    #[serde(skip)]
    pub input_filter: Option<InputFilter>,
    /// Output path template, rendered with the post's metadata.
    pub output: String,
    /// Name of the content template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Template directories searched after `<base-dir>/templates`.
    /// Empty means the built-in theme.
    pub template_dirs: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            input_pattern: "org$".to_string(),
            input_exclude: "^$".to_string(),
            input_filter: None,
            output: "output/{{ slug }}.html".to_string(),
            template: None,
            template_dirs: Vec::new(),
        }
    }
}

impl Config {
    /// Shorthand for library callers: defaults plus a base dir and template.
    pub fn new(base_dir: impl Into<PathBuf>, template: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            template: Some(template.into()),
            ..Self::default()
        }
    }

    pub fn with_input_filter(
        mut self,
        predicate: impl Fn(&Metadata) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.input_filter = Some(InputFilter::new(predicate));
        self
    }

    /// Check that the config can drive a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.template.as_deref() {
            None => {
                return Err(ConfigError::Validation(
                    "template must be set (name of the content template)".into(),
                ));
            }
            Some(t) if t.trim().is_empty() => {
                return Err(ConfigError::Validation("template must not be empty".into()));
            }
            Some(_) => {}
        }
        self.include_regex()?;
        self.exclude_regex()?;
        Ok(())
    }

    pub fn content_template(&self) -> Result<&str, ConfigError> {
        self.template
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("template must be set".into()))
    }

    pub fn include_regex(&self) -> Result<Regex, ConfigError> {
        compile("input-pattern", &self.input_pattern)
    }

    pub fn exclude_regex(&self) -> Result<Regex, ConfigError> {
        compile("input-exclude", &self.input_exclude)
    }

    /// The base dir as an absolute directory name ending in a separator.
    ///
    /// Output paths are built by plain concatenation onto this value, so the
    /// trailing separator is what keeps `base` and `output/x.html` apart.
    pub fn base_dir_name(&self) -> Result<PathBuf, ConfigError> {
        let absolute = std::path::absolute(&self.base_dir)?;
        let mut name = absolute.into_os_string();
        if !name.as_encoded_bytes().ends_with(MAIN_SEPARATOR_STR.as_bytes()) {
            name.push(MAIN_SEPARATOR_STR);
        }
        Ok(PathBuf::from(name))
    }
}

fn compile(option: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern)
        .map_err(|e| ConfigError::Validation(format!("{option} is not a valid regex: {e}")))
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
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

/// Load `orgpress.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Build the effective config for a site rooted at `base_dir`.
///
/// Layers stock defaults, the site's `orgpress.toml`, and `overrides`
/// (typically built from command-line flags), then validates the result.
/// `base_dir` itself always comes from the caller.
pub fn load_config(base_dir: &Path, overrides: toml::Value) -> Result<Config, ConfigError> {
    let mut merged = stock_defaults_value();
    if let Some(file) = load_raw_config(base_dir)? {
        merged = merge_toml(merged, file);
    }
    merged = merge_toml(merged, overrides);

    let mut config: Config = merged.try_into()?;
    config.base_dir = base_dir.to_path_buf();
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `orgpress.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# orgpress configuration
# ======================
# Place this file at the root of your site as `orgpress.toml`.
# Command-line flags override values set here.
# Unknown keys will cause an error.

# Regular expression matched against the absolute path of every file under
# the site directory. Matching files are converted.
input-pattern = "org$"

# Regular expression for paths to skip. The default matches nothing.
input-exclude = "^$"

# Where each post is written, relative to the site directory. Rendered as a
# template with the post's keywords in scope (lower-cased), plus `slug`.
output = "output/{{ slug }}.html"

# Template used to render each post (required). Looked up in
# `templates/` first, then in `template-dirs`.
# template = "post.html"

# Additional template directories, searched in order after `templates/`.
# Leave empty to use the built-in theme.
template-dirs = []
"##
}
