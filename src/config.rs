//! Defaults and the accepted activity list
//!
//! Everything the tool used to hard-code lives in [`Config`]. The built-in
//! values can be overridden from TOML files:
//!
//! ```toml
//! activities = ["SOTA", "POTA", "WWFF"]
//!
//! [defaults]
//! output_path = "log_updated.adi"
//! value = "POTA"
//! field_name = "OTHER"
//!
//! [chase]
//! output_path = "log_grid.adi"
//! grid_field = "MY_GRIDSQUARE"
//! grid_square = "FN31"
//! ```
//!
//! Keys left out keep their built-in value.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "adif-edit";
const USER_CONFIG_FILE: &str = "config.toml";
const LOCAL_CONFIG_FILE: &str = "adif-edit.toml";

/// Activity values accepted without asking for an override
pub const DEFAULT_ACTIVITIES: &[&str] = &["SOTA", "POTA", "SPOTA", "CHASE", "HUNT", "FIELD", "CONTEST"];

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Values used by `--force` and as prompt defaults
    pub defaults: Defaults,
    /// Accepted field values; anything else needs an explicit override
    pub activities: Vec<String>,
    /// Settings for the extra grid-square pass of `--chase`
    pub chase: ChaseDefaults,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Defaults {
    pub output_path: PathBuf,
    pub value: String,
    pub field_name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChaseDefaults {
    pub output_path: PathBuf,
    pub grid_field: String,
    pub grid_square: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            activities: DEFAULT_ACTIVITIES.iter().map(|a| a.to_string()).collect(),
            chase: ChaseDefaults::default(),
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("foo.adi"),
            value: String::from("SOTA"),
            field_name: String::from("OTHER"),
        }
    }
}

impl Default for ChaseDefaults {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("foo_grid.adi"),
            grid_field: String::from("MY_GRIDSQUARE"),
            grid_square: String::from("FN31"),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML content
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from a single file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let table = read_table(path)?;
        Self::from_table(table).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration with user overrides from standard locations
    ///
    /// Searches in priority order:
    /// 1. Built-in defaults
    /// 2. `<config dir>/adif-edit/config.toml`
    /// 3. `./adif-edit.toml`
    ///
    /// Later files override individual keys of earlier ones. A file that cannot
    /// be read or parsed is skipped with a warning.
    pub fn load_with_overrides() -> Result<Self> {
        let mut paths = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(CONFIG_DIR_NAME).join(USER_CONFIG_FILE));
        }
        paths.push(PathBuf::from(LOCAL_CONFIG_FILE));

        Self::load_layers(&paths)
    }

    /// Merge the given files, in order, over the built-in defaults
    pub fn load_layers(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = toml::Table::new();

        for path in paths {
            if !path.exists() {
                continue;
            }
            match read_table(path).and_then(|table| validate_layer(path, table)) {
                Ok(table) => {
                    debug!("loaded config from {}", path.display());
                    merge_tables(&mut merged, table);
                }
                Err(e) => warn!("skipping config {}: {}", path.display(), e),
            }
        }

        Self::from_table(merged).map_err(|source| Error::Config {
            path: paths.last().cloned().unwrap_or_default(),
            source,
        })
    }

    fn from_table(table: toml::Table) -> std::result::Result<Self, toml::de::Error> {
        toml::Value::Table(table).try_into()
    }

    /// Whether `value` is one of the accepted activities (case-insensitive)
    pub fn is_known_activity(&self, value: &str) -> bool {
        self.activities.iter().any(|a| a.eq_ignore_ascii_case(value))
    }

    /// Accepted activities joined for display
    pub fn activity_list(&self, separator: &str) -> String {
        self.activities.join(separator)
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Reject a layer whose keys have the wrong types before it is merged
fn validate_layer(path: &Path, table: toml::Table) -> Result<toml::Table> {
    Config::from_table(table.clone()).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(table)
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Output path proposed when none was given
///
/// `log.adi` becomes `log_updated.adi` and `log.adif` becomes
/// `log_updated.adif`; anything else gets `_updated.adi` appended.
pub fn default_output_path(input: &Path) -> PathBuf {
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.eq_ignore_ascii_case("adi") || e.eq_ignore_ascii_case("adif"));

    match (extension, input.file_stem().and_then(|s| s.to_str())) {
        (Some(ext), Some(stem)) => input.with_file_name(format!("{}_updated.{}", stem, ext)),
        _ => {
            let mut name = input.as_os_str().to_os_string();
            name.push("_updated.adi");
            PathBuf::from(name)
        }
    }
}
