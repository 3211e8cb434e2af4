//! Indexer configuration
//!
//! Settings are resolved with the following priority:
//! 1. Environment variables (`ADP_SCHEMA`, `ADP_RECURSIVE`)
//! 2. `.adp.toml` in the scan root
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".adp.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid exclude pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Descend into subdirectories.
    pub recursive: bool,

    /// Also scan dot-files and dot-directories.
    pub include_hidden: bool,

    /// Honour `.gitignore` / `.ignore` files.
    pub respect_gitignore: bool,

    /// Glob patterns (relative to the scan root) to skip.
    pub exclude: Vec<String>,

    /// Extra schema definition files to register.
    pub schemas: Vec<PathBuf>,

    /// Schema to activate after registration.
    pub active_schema: Option<String>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            include_hidden: false,
            respect_gitignore: true,
            exclude: Vec::new(),
            schemas: Vec::new(),
            active_schema: None,
        }
    }
}

impl IndexerConfig {
    /// Load `.adp.toml` from `root` if present, else defaults.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            return Self::from_file(&path);
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file.
    ///
    /// Relative schema paths are resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: IndexerConfig = toml::from_str(&content)?;

        if let Some(base) = path.parent() {
            for schema in &mut config.schemas {
                if schema.is_relative() {
                    *schema = base.join(&*schema);
                }
            }
        }

        config.apply_env_overrides();
        tracing::debug!("Loaded indexer config from {}", path.display());
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(schema) = std::env::var("ADP_SCHEMA") {
            if !schema.is_empty() {
                self.active_schema = Some(schema);
            }
        }
        if let Ok(recursive) = std::env::var("ADP_RECURSIVE") {
            match recursive.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.recursive = true,
                "0" | "false" | "no" => self.recursive = false,
                other => tracing::warn!("Ignoring ADP_RECURSIVE={}", other),
            }
        }
    }

    /// Compile the exclude patterns.
    pub fn exclude_set(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| ConfigError::InvalidGlob {
            pattern: self.exclude.join(","),
            message: e.to_string(),
        })
    }

    /// Default config file content.
    pub fn default_config_string() -> String {
        toml::to_string_pretty(&IndexerConfig::default()).unwrap_or_default()
    }
}
