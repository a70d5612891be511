//! Inline mapping and schema default sources.

use super::{ConfigMap, ConfigSource};
use crate::core::schema;
use crate::error::Result;

/// A configuration source backed by a mapping supplied in code.
///
/// # Examples
///
/// ```rust
/// use kheops_resolver::sources::{ConfigSource, InlineSource};
/// use serde_json::json;
///
/// let source = InlineSource::from_value(json!({"namespace": "ansible"})).unwrap();
/// assert_eq!(source.load().unwrap()["namespace"], "ansible");
/// ```
#[derive(Debug, Clone)]
pub struct InlineSource {
    values: ConfigMap,
    label: String,
    priority: i32,
}

impl InlineSource {
    /// Create an inline source from a mapping.
    pub fn new(values: ConfigMap) -> Self {
        Self {
            values,
            label: "inline".to_string(),
            priority: 200,
        }
    }

    /// Create an inline source from a JSON value, which must be an object.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(values) => Some(Self::new(values)),
            _ => None,
        }
    }

    /// Set the label shown in logs.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the priority for this source.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl ConfigSource for InlineSource {
    fn load(&self) -> Result<ConfigMap> {
        Ok(self.values.clone())
    }

    fn name(&self) -> String {
        self.label.clone()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// The lowest layer: one entry per schema option with its declared default.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
    fn load(&self) -> Result<ConfigMap> {
        Ok(schema::defaults())
    }

    fn name(&self) -> String {
        "defaults".to_string()
    }

    fn priority(&self) -> i32 {
        0
    }
}
