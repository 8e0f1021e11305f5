// Layered configuration: CLI flags > environment > YAML file > defaults

use crate::backend::{Backend, FileBackend};
use crate::models::Task;
use crate::record::Record;
use crate::sqlite::SqliteBackend;
use clap::ValueEnum;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "tasklist";
const CONFIG_FILE_NAME: &str = "config.yaml";
const DB_FILE_NAME: &str = "tasklist.db";

/// Which durable backend holds the task blob
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One JSON file per key
    #[default]
    File,
    /// Key-value table in a SQLite database
    Sqlite,
}

/// Config file contents; every field is optional so the file can override piecemeal
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub backend: Option<BackendKind>,
    pub store_path: Option<PathBuf>,
    pub key: Option<String>,
    pub log_level: Option<String>,
}

/// Values given on the command line (or through their env vars)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub backend: Option<BackendKind>,
    pub store_path: Option<PathBuf>,
    pub key: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: BackendKind,
    pub store_path: PathBuf,
    pub key: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            store_path: default_store_path(),
            key: Task::collection_name().to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load the config file and merge `overrides` on top
    ///
    /// An explicit `config_path` must exist. The default path may be missing,
    /// in which case only defaults and overrides apply.
    pub fn load(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let file = match config_path {
            Some(path) => load_config_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => load_config_file(&path)?,
                _ => ConfigFile::default(),
            },
        };
        Ok(Self::resolve(&file, overrides))
    }

    /// Priority: overrides > file > default
    pub fn resolve(file: &ConfigFile, overrides: &ConfigOverrides) -> Self {
        let defaults = Self::default();

        Self {
            backend: overrides.backend.or(file.backend).unwrap_or(defaults.backend),
            store_path: overrides
                .store_path
                .clone()
                .or_else(|| file.store_path.clone())
                .unwrap_or(defaults.store_path),
            key: overrides
                .key
                .clone()
                .or_else(|| file.key.clone())
                .unwrap_or(defaults.key),
            log_level: overrides
                .log_level
                .clone()
                .or_else(|| file.log_level.clone())
                .unwrap_or(defaults.log_level),
        }
    }

    /// Open the configured backend
    pub fn open_backend(&self) -> Result<Box<dyn Backend>> {
        debug!(backend = ?self.backend, path = ?self.store_path, "Opening backend");
        match self.backend {
            BackendKind::File => Ok(Box::new(FileBackend::open(&self.store_path)?)),
            BackendKind::Sqlite => Ok(Box::new(SqliteBackend::open(self.store_path.join(DB_FILE_NAME))?)),
        }
    }
}

/// `~/.config/tasklist/config.yaml` (platform config dir)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE_NAME))
}

/// Platform data dir, or `.tasklist` in the working directory when there is none
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".tasklist"))
}

fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    let file: ConfigFile = serde_yaml::from_str(&content)
        .map_err(|e| eyre!("Invalid YAML in {}: {}", path.display(), e))?;
    debug!(path = ?path, "Loaded config file");
    Ok(file)
}
