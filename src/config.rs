//! Registry configuration module.
//!
//! Handles loading, validating, and merging `registry.toml`. Stock defaults
//! describe the messy-ui layout; a project only has to write the keys it wants
//! to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! name = "messy-ui"
//! homepage = "https://messyui.dev"
//! source_dir = "registry/new-york"     # One subdirectory per component
//! output_dir = "public/r"              # Per-component manifests land here
//! index_path = "registry.json"         # Aggregate index
//! path_prefix = "registry/new-york"    # Prefix of primary file paths in manifests
//! item_schema = "https://ui.shadcn.com/schema/registry-item.json"
//! index_schema = "https://ui.shadcn.com/schema/registry.json"
//!
//! [sources]
//! extensions = ["tsx", "ts", "jsx", "js"]
//! ignore = ["index.ts", "index.tsx", "example.tsx", "meta.ts"]
//! test_markers = [".test.", ".spec.", ".stories."]
//!
//! [counter]
//! max_rotations = 20
//! duration = 2.0
//!
//! [sitemap]
//! base_url = "https://messyui.dev"
//! output_dir = "public"
//!
//! [build]
//! max_threads = 4                      # Omit for auto = CPU cores
//! prune = false                        # Delete manifests of removed components
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up when no `--config` path is given.
pub const CONFIG_FILENAME: &str = "registry.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Registry configuration loaded from `registry.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Registry name written to the index.
    pub name: String,
    /// Site homepage written to the index.
    pub homepage: String,
    /// Directory holding one subdirectory per component.
    pub source_dir: PathBuf,
    /// Directory receiving `<slug>.json` manifests.
    pub output_dir: PathBuf,
    /// Path of the aggregate index file.
    pub index_path: PathBuf,
    /// Prefix for primary file paths inside manifests.
    pub path_prefix: String,
    /// `$schema` of per-component manifests.
    pub item_schema: String,
    /// `$schema` of the index.
    pub index_schema: String,
    pub sources: SourcesConfig,
    pub counter: CounterConfig,
    pub sitemap: SitemapConfig,
    pub build: BuildConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: "messy-ui".to_string(),
            homepage: "https://messyui.dev".to_string(),
            source_dir: PathBuf::from("registry/new-york"),
            output_dir: PathBuf::from("public/r"),
            index_path: PathBuf::from("registry.json"),
            path_prefix: "registry/new-york".to_string(),
            item_schema: "https://ui.shadcn.com/schema/registry-item.json".to_string(),
            index_schema: "https://ui.shadcn.com/schema/registry.json".to_string(),
            sources: SourcesConfig::default(),
            counter: CounterConfig::default(),
            sitemap: SitemapConfig::default(),
            build: BuildConfig::default(),
        }
    }
}

impl RegistryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation("name must not be empty".into()));
        }
        if self.sources.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "sources.extensions must not be empty".into(),
            ));
        }
        if self.sources.extensions.iter().any(|e| e.starts_with('.')) {
            return Err(ConfigError::Validation(
                "sources.extensions are written without a leading dot".into(),
            ));
        }
        if i64::try_from(self.counter.max_rotations).is_err() {
            return Err(ConfigError::Validation(format!(
                "counter.max_rotations must be at most {}",
                i64::MAX
            )));
        }
        if !(self.counter.duration.is_finite() && self.counter.duration > 0.0) {
            return Err(ConfigError::Validation(
                "counter.duration must be a positive number of seconds".into(),
            ));
        }
        if self.build.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "build.max_threads must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Which files in a component directory count as primary sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    /// Extensions (without dot) of primary source files.
    pub extensions: Vec<String>,
    /// Exact file names never treated as sources.
    pub ignore: Vec<String>,
    /// Substrings marking test or story files.
    pub test_markers: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            extensions: ["tsx", "ts", "jsx", "js"].map(String::from).to_vec(),
            ignore: ["index.ts", "index.tsx", "example.tsx", "meta.ts"]
                .map(String::from)
                .to_vec(),
            test_markers: [".test.", ".spec.", ".stories."].map(String::from).to_vec(),
        }
    }
}

/// Odometer counter defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CounterConfig {
    /// Rotation cap above which wheels fold back to whole cycles.
    pub max_rotations: u64,
    /// Animation duration in seconds.
    pub duration: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            max_rotations: crate::counter::DEFAULT_MAX_ROTATIONS,
            duration: 2.0,
        }
    }
}

/// Sitemap and redirect generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    /// Public site URL, without trailing slash.
    pub base_url: String,
    /// Where `sitemap.xml` and `redirects.json` are written.
    pub output_dir: PathBuf,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            base_url: "https://messyui.dev".to_string(),
            output_dir: PathBuf::from("public"),
        }
    }
}

/// Manifest writing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Maximum number of parallel manifest writers.
    /// When absent, defaults to the number of CPU cores.
    pub max_threads: Option<usize>,
    /// Delete `*.json` files in the output directory that no longer belong
    /// to a component.
    pub prune: bool,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &BuildConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(RegistryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
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

/// Read a config file as a raw TOML value. `Ok(None)` when it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<RegistryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: RegistryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, falling back to stock defaults when absent.
pub fn load_config(path: &Path) -> Result<RegistryConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `registry.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# messy-registry configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Registry name and homepage, written to the aggregate index.
name = "messy-ui"
homepage = "https://messyui.dev"

# Directory with one subdirectory per component. Each component directory
# holds a meta.toml (or meta.json) and its source files.
source_dir = "registry/new-york"

# Per-component manifests are written to <output_dir>/<slug>.json.
output_dir = "public/r"

# Aggregate index consumed by the installer CLI.
index_path = "registry.json"

# Prefix of primary file paths inside manifests:
#   <path_prefix>/<component dir>/<file>
path_prefix = "registry/new-york"

# JSON schema URLs stamped into manifests and the index.
item_schema = "https://ui.shadcn.com/schema/registry-item.json"
index_schema = "https://ui.shadcn.com/schema/registry.json"

# ---------------------------------------------------------------------------
# Source discovery
# ---------------------------------------------------------------------------
[sources]
# Extensions (without dot) of primary component files.
extensions = ["tsx", "ts", "jsx", "js"]

# Exact file names that are never shipped as component files.
ignore = ["index.ts", "index.tsx", "example.tsx", "meta.ts"]

# Files whose names contain any of these are treated as tests and skipped.
test_markers = [".test.", ".spec.", ".stories."]

# ---------------------------------------------------------------------------
# Odometer counter
# ---------------------------------------------------------------------------
[counter]
# Wheels that would turn more than this many steps fold back to
# floor(max_rotations / 10) full cycles plus the final digit.
max_rotations = 20

# Animation duration in seconds.
duration = 2.0

# ---------------------------------------------------------------------------
# Sitemap and alias redirects
# ---------------------------------------------------------------------------
[sitemap]
base_url = "https://messyui.dev"
output_dir = "public"

# ---------------------------------------------------------------------------
# Build
# ---------------------------------------------------------------------------
[build]
# Maximum parallel manifest writers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4

# Delete *.json files in output_dir that no longer match a component slug.
# Leave off when output_dir is shared with other files.
prune = false
"##
}
