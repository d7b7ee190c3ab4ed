//! Storage configuration (YAML/Env loading)
//!
//! Precedence, lowest first: defaults, environment, YAML file. Callers layer
//! command-line overrides on top of the returned value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, StorageError};

pub const ENV_STORAGE: &str = "GAMEBK_STORAGE";
pub const ENV_DB_PATH: &str = "GAMEBK_DB_PATH";
pub const DEFAULT_DB_PATH: &str = "./data/gamebk.db";

const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Which repository backend to deploy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Embedded key-value store (redb)
    #[default]
    Kv,
    /// Relational store (SQLite)
    Sqlite,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Kv => "kv",
            BackendKind::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kv" | "redb" => Ok(BackendKind::Kv),
            "sqlite" | "sql" => Ok(BackendKind::Sqlite),
            other => Err(StorageError::config(format!(
                "Unknown storage backend '{}'. Valid backends: kv, sqlite",
                other
            ))),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: BackendKind,
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StorageConfigFileV1 {
    version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    backend: Option<BackendKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    db_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn new(backend: BackendKind, db_path: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            db_path: db_path.into(),
        }
    }

    /// Defaults overridden by `GAMEBK_STORAGE` / `GAMEBK_DB_PATH`
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an environment lookup (empty values are ignored)
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(backend) = present(ENV_STORAGE) {
            self.backend = backend.parse()?;
        }
        if let Some(path) = present(ENV_DB_PATH) {
            self.db_path = PathBuf::from(path);
        }
        Ok(self)
    }

    /// Parse a YAML document on top of `self`
    pub fn merge_yaml_str(mut self, yaml: &str) -> Result<Self> {
        let file: StorageConfigFileV1 = serde_yaml::from_str(yaml)?;
        if !SUPPORTED_VERSIONS.contains(&file.version) {
            return Err(StorageError::config(format!(
                "Unsupported configuration version {}. Supported versions: {:?}",
                file.version, SUPPORTED_VERSIONS
            )));
        }
        if let Some(backend) = file.backend {
            self.backend = backend;
        }
        if let Some(db_path) = file.db_path {
            self.db_path = db_path;
        }
        Ok(self)
    }

    /// Defaults overridden by a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::default().merge_yaml_str(yaml)
    }

    /// Defaults, then environment, then the YAML file at `path`
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|err| {
            StorageError::config(format!("cannot read config {}: {}", path.display(), err))
                .with_source(err)
        })?;
        Self::from_env()?.merge_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String> {
        let file = StorageConfigFileV1 {
            version: 1,
            backend: Some(self.backend),
            db_path: Some(self.db_path.clone()),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}
