//! Caller-facing description of one configuration source.

use super::{ConfigMap, ConfigSource, FileSource, InlineSource};
use crate::error::{KheopsError, Result};
use serde_json::Value;
use std::path::PathBuf;

/// One entry of the caller-supplied source list.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    /// Path to a structured document holding one flat mapping.
    File(PathBuf),
    /// A mapping used as-is.
    Inline(ConfigMap),
    /// Nothing to merge; skipped.
    Absent,
}

impl SourceSpec {
    /// Classify a loosely-typed value: string is a path, object is inline,
    /// null is absent.
    ///
    /// # Errors
    ///
    /// Any other shape is rejected with [`KheopsError::InvalidConfigSource`].
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(path) => Ok(Self::File(PathBuf::from(path))),
            Value::Object(map) => Ok(Self::Inline(map)),
            Value::Null => Ok(Self::Absent),
            other => Err(KheopsError::InvalidConfigSource(format!(
                "Bad config for: {}",
                other
            ))),
        }
    }

    /// Turn this entry into a loadable source at the given priority.
    pub(crate) fn into_source(self, priority: i32) -> Option<Box<dyn ConfigSource>> {
        match self {
            Self::File(path) => Some(Box::new(FileSource::new(path).with_priority(priority))),
            Self::Inline(map) => Some(Box::new(InlineSource::new(map).with_priority(priority))),
            Self::Absent => None,
        }
    }
}

impl From<PathBuf> for SourceSpec {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&str> for SourceSpec {
    fn from(path: &str) -> Self {
        Self::File(PathBuf::from(path))
    }
}

impl From<ConfigMap> for SourceSpec {
    fn from(map: ConfigMap) -> Self {
        Self::Inline(map)
    }
}

impl<T: Into<SourceSpec>> From<Option<T>> for SourceSpec {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}
