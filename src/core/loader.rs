//! Configuration resolver that merges the layered sources.

use crate::error::{KheopsError, Result};
use crate::sources::{ConfigMap, ConfigSource, DefaultsSource, EnvSource, FileSource, SourceSpec};
use serde_json::Value;
use std::path::PathBuf;

/// Priority of the first caller source; each following one adds 10.
const CALLER_BASE_PRIORITY: i32 = 200;

/// Loads and merges configuration from multiple sources.
///
/// Sources are merged in priority order (lower priority first). Each
/// top-level key of a higher priority source replaces the previous value
/// whole; nested mappings are not merged.
///
/// A source that sets the `config` option to a path pulls that file in
/// right above itself: the file overrides the source, and every later
/// source overrides the file. A `config` entry inside the included file is
/// not followed.
pub struct ConfigResolver {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Create a resolver with the standard layers: schema defaults, the
    /// given environment source, then the caller sources in order.
    pub fn layered(env: Option<EnvSource>, specs: impl IntoIterator<Item = SourceSpec>) -> Self {
        let mut resolver = Self::new();
        resolver.add_source(Box::new(DefaultsSource));
        if let Some(env) = env {
            resolver.add_source(Box::new(env));
        }
        for (index, spec) in specs.into_iter().enumerate() {
            let priority = CALLER_BASE_PRIORITY + (index as i32 * 10);
            if let Some(source) = spec.into_source(priority) {
                resolver.add_source(source);
            }
        }
        resolver
    }

    /// Add a configuration source.
    pub fn add_source(&mut self, source: Box<dyn ConfigSource>) {
        self.sources.push(source);
    }

    /// Load and merge configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any source; nothing is merged
    /// partially.
    pub fn resolve(&self) -> Result<ConfigMap> {
        // Stable sort keeps insertion order among equal priorities
        let mut sorted_sources: Vec<_> = self.sources.iter().collect();
        sorted_sources.sort_by_key(|s| s.priority());

        let mut merged = ConfigMap::new();
        for source in sorted_sources {
            let values = source.load()?;
            let included = included_file(&values)?;
            tracing::trace!(source = %source.name(), keys = values.len(), "merging configuration source");
            merged.extend(values);

            if let Some(path) = included {
                let file = FileSource::new(path);
                let mut values = file.load()?;
                values.remove("config");
                tracing::trace!(source = %file.name(), keys = values.len(), "merging included configuration file");
                merged.extend(values);
            }
        }

        Ok(merged)
    }

    /// Get the list of source names in priority order.
    pub fn source_names(&self) -> Vec<String> {
        let mut sorted_sources: Vec<_> = self.sources.iter().collect();
        sorted_sources.sort_by_key(|s| s.priority());
        sorted_sources.iter().map(|s| s.name()).collect()
    }
}

/// The extra file named by a source's `config` option, if any.
fn included_file(values: &ConfigMap) -> Result<Option<PathBuf>> {
    match values.get("config") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(path)) if path.is_empty() => Ok(None),
        Some(Value::String(path)) => Ok(Some(PathBuf::from(path))),
        Some(other) => Err(KheopsError::invalid_option(
            "config",
            format!("expected a file path, got: {}", other),
        )),
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}
