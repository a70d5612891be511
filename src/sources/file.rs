//! File-based configuration source.

use super::{ConfigMap, ConfigSource};
use crate::error::{KheopsError, Result};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// File-based configuration source.
///
/// Loads one flat mapping from a YAML, TOML, or JSON document with format
/// detection based on the file extension.
///
/// # Examples
///
/// ```rust,no_run
/// use kheops_resolver::sources::FileSource;
///
/// let source = FileSource::new("site/ansible-kheops.yml");
/// ```
pub struct FileSource {
    path: PathBuf,
    priority: i32,
}

impl FileSource {
    /// Create a new file source with automatic format detection.
    ///
    /// The format is detected from the file extension:
    /// - `.yaml`, `.yml` -> YAML
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            priority: 200,
        }
    }

    /// Set the priority for this source.
    ///
    /// Higher priority sources override lower priority ones.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn parse_error(&self, err: impl std::fmt::Display) -> KheopsError {
        KheopsError::ParseError(format!("Failed to load {}: {}", self.path.display(), err))
    }

    /// Validate that the file extension is supported.
    fn validate_extension(&self) -> Result<()> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                KheopsError::ParseError(format!(
                    "Unable to determine file format for: {}",
                    self.path.display()
                ))
            })?;

        match extension {
            "yaml" | "yml" | "toml" | "json" => Ok(()),
            _ => Err(KheopsError::ParseError(format!(
                "Unsupported file extension: {}. Supported: .yaml, .yml, .toml, .json",
                extension
            ))),
        }
    }
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<ConfigMap> {
        if !self.path.is_file() {
            return Err(KheopsError::ConfigSourceNotFound(self.path.clone()));
        }

        self.validate_extension()?;

        tracing::debug!(path = %self.path.display(), "reading configuration file");

        let content = fs::read_to_string(&self.path)?;
        // Keys are data (scope fields, key names): no case folding
        let document: Value = match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| self.parse_error(e))?,
            Some("json") => serde_json::from_str(&content).map_err(|e| self.parse_error(e))?,
            _ => serde_yaml::from_str(&content).map_err(|e| self.parse_error(e))?,
        };

        match document {
            Value::Object(map) => Ok(map),
            other => Err(KheopsError::InvalidConfigSource(format!(
                "{} is not a mapping: {}",
                self.path.display(),
                other
            ))),
        }
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
