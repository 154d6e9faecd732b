//! Tool configuration.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Stock defaults ([`ToolConfig::default`])
//! 2. An optional `puzzle-gen.toml` in the working directory, or the file
//!    named by `--config`
//! 3. Command-line flags (`--csv`, `--puzzles`, `--manifest`, `--dry-run`)
//!
//! The resolved values are flattened into a [`GenerateConfig`], which is the
//! only thing the pipeline sees.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! csv = "content_generation.csv"   # Content table (CSV or TSV)
//! puzzles_dir = "puzzles"          # Where {dateKey}.v{version}.json files go
//! manifest = "manifest.json"       # Manifest index, must already exist
//!
//! [columns]
//! date_key = "dateKey (YYYY-MM-DD)"
//! category = "category"
//! tags = "tags (semicolon-separated)"
//! answer_canonical = "answerCanonical"
//! answer_aliases = "answerAliases (comma-separated)"
//! solution_explanation = "solutionExplanation"
//! version = "version"
//! content_hash = "contentHash"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "puzzle-gen.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Contents of `puzzle-gen.toml`, with stock defaults for anything omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Input and output locations.
    pub paths: PathsConfig,
    /// Header names of the content table.
    pub columns: ColumnConfig,
}

impl ToolConfig {
    /// Validate that paths are set and column names are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("paths.csv", &self.paths.csv),
            ("paths.puzzles_dir", &self.paths.puzzles_dir),
            ("paths.manifest", &self.paths.manifest),
        ] {
            if value.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }

        let mut seen = HashSet::new();
        for (key, name) in self.columns.named() {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "columns.{key} must not be empty"
                )));
            }
            if !seen.insert(name) {
                return Err(ConfigError::Validation(format!(
                    "columns.{key} duplicates another column name: {name:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Where the table, artifacts and manifest live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub csv: PathBuf,
    pub puzzles_dir: PathBuf,
    pub manifest: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            csv: PathBuf::from("content_generation.csv"),
            puzzles_dir: PathBuf::from("puzzles"),
            manifest: PathBuf::from("manifest.json"),
        }
    }
}

/// Header names for each field of the content table.
///
/// Hint columns are positional and not configurable: `hint1..hint5` and
/// `hint1Explanation..hint5Explanation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnConfig {
    pub date_key: String,
    pub category: String,
    pub tags: String,
    pub answer_canonical: String,
    pub answer_aliases: String,
    pub solution_explanation: String,
    pub version: String,
    /// Added to the table on first run if missing.
    pub content_hash: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            date_key: "dateKey (YYYY-MM-DD)".to_string(),
            category: "category".to_string(),
            tags: "tags (semicolon-separated)".to_string(),
            answer_canonical: "answerCanonical".to_string(),
            answer_aliases: "answerAliases (comma-separated)".to_string(),
            solution_explanation: "solutionExplanation".to_string(),
            version: "version".to_string(),
            content_hash: "contentHash".to_string(),
        }
    }
}

impl ColumnConfig {
    /// Columns that must be present in the table header.
    pub fn required(&self) -> [&str; 7] {
        [
            self.date_key.as_str(),
            self.category.as_str(),
            self.tags.as_str(),
            self.answer_canonical.as_str(),
            self.answer_aliases.as_str(),
            self.solution_explanation.as_str(),
            self.version.as_str(),
        ]
    }

    fn named(&self) -> [(&'static str, &str); 8] {
        [
            ("date_key", self.date_key.as_str()),
            ("category", self.category.as_str()),
            ("tags", self.tags.as_str()),
            ("answer_canonical", self.answer_canonical.as_str()),
            ("answer_aliases", self.answer_aliases.as_str()),
            ("solution_explanation", self.solution_explanation.as_str()),
            ("version", self.version.as_str()),
            ("content_hash", self.content_hash.as_str()),
        ]
    }
}

/// `(text, explanation)` column names for hint slots 1 through 5.
pub fn hint_columns() -> Vec<(String, String)> {
    (1..=5)
        .map(|i| (format!("hint{i}"), format!("hint{i}Explanation")))
        .collect()
}

/// Everything one pipeline run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateConfig {
    pub csv_path: PathBuf,
    pub puzzles_dir: PathBuf,
    pub manifest_path: PathBuf,
    /// Compute and report changes without writing any file.
    pub dry_run: bool,
    pub columns: ColumnConfig,
}

impl GenerateConfig {
    /// Resolve against a loaded [`ToolConfig`]; `Some` overrides win.
    pub fn resolve(
        tool: ToolConfig,
        csv: Option<PathBuf>,
        puzzles_dir: Option<PathBuf>,
        manifest: Option<PathBuf>,
        dry_run: bool,
    ) -> Self {
        Self {
            csv_path: csv.unwrap_or(tool.paths.csv),
            puzzles_dir: puzzles_dir.unwrap_or(tool.paths.puzzles_dir),
            manifest_path: manifest.unwrap_or(tool.paths.manifest),
            dry_run,
            columns: tool.columns,
        }
    }

    /// Stock column names with explicit paths.
    pub fn new(
        csv_path: impl Into<PathBuf>,
        puzzles_dir: impl Into<PathBuf>,
        manifest_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            csv_path: csv_path.into(),
            puzzles_dir: puzzles_dir.into(),
            manifest_path: manifest_path.into(),
            dry_run: false,
            columns: ColumnConfig::default(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ToolConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
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

/// Parse a config file into a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto the stock defaults, deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the tool config.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] in
/// `working_dir` is used if present, and stock defaults otherwise.
pub fn load_config(
    explicit: Option<&Path>,
    working_dir: &Path,
) -> Result<ToolConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
        Some(path) => Some(load_raw_config(path)?),
        None => {
            let implicit = working_dir.join(DEFAULT_CONFIG_FILE);
            if implicit.exists() {
                Some(load_raw_config(&implicit)?)
            } else {
                None
            }
        }
    };
    resolve_config(overlay)
}

/// A fully-commented stock `puzzle-gen.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# puzzle-gen configuration
# ========================
# Every key is optional. Command-line flags override [paths].

[paths]
# Content table. Tab-separated if the header line contains a tab,
# comma-separated otherwise.
csv = "content_generation.csv"

# Output directory for {dateKey}.v{version}.json artifacts.
puzzles_dir = "puzzles"

# Manifest index. Must already exist (an empty `{}` is fine).
manifest = "manifest.json"

[columns]
# Header names in the content table. Hint columns are fixed:
# hint1..hint5 and hint1Explanation..hint5Explanation.
date_key = "dateKey (YYYY-MM-DD)"
category = "category"
tags = "tags (semicolon-separated)"
answer_canonical = "answerCanonical"
answer_aliases = "answerAliases (comma-separated)"
solution_explanation = "solutionExplanation"
version = "version"

# Written by puzzle-gen; appended to the table if missing.
content_hash = "contentHash"
"##
}
