use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::scanner::ScanOptions;

pub const DEFAULT_CONFIG_PATH: &str = "./tugboat.config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_glob_pattern")]
    pub glob_pattern: Vec<String>,
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
    #[serde(default = "default_roots")]
    pub roots: Vec<String>,
    /// Skip files listed in `.gitignore` as well as the `ignore` entries.
    #[serde(default)]
    pub respect_gitignore: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize default config: {0}")]
    Serialize(String),
}

fn default_glob_pattern() -> Vec<String> {
    vec!["*.html".to_string()]
}

fn default_ignore() -> Vec<String> {
    vec!["node_modules".to_string()]
}

fn default_roots() -> Vec<String> {
    vec![".".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            glob_pattern: default_glob_pattern(),
            ignore: default_ignore(),
            roots: default_roots(),
            respect_gitignore: false,
            catalog: None,
        }
    }
}

impl Config {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            roots: self.roots.iter().map(PathBuf::from).collect(),
            include: self.glob_pattern.clone(),
            ignore: self.ignore.clone(),
            respect_gitignore: self.respect_gitignore,
            ..ScanOptions::default()
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// Loads a config file; `.toml` files are read as TOML, everything else as JSON.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if is_toml(path) {
        toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Renders the default config in the format implied by `path`.
pub fn render_default(path: &Path) -> Result<String, ConfigError> {
    let config = Config::default();
    if is_toml(path) {
        toml::to_string_pretty(&config).map_err(|err| ConfigError::Serialize(err.to_string()))
    } else {
        serde_json::to_string_pretty(&config)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|err| ConfigError::Serialize(err.to_string()))
    }
}
