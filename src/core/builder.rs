//! Builder for constructing KheopsLookup instances.

use crate::backend::{Backend, BackendError, InstanceSettings};
use crate::core::{ConfigResolver, KheopsLookup, Mode, Settings};
use crate::error::{KheopsError, Result};
use crate::sources::{ConfigSource, EnvSource, SourceSpec};
use serde_json::Value;
use std::path::PathBuf;

/// Builder for constructing a [`KheopsLookup`] session.
///
/// Configuration is layered as schema defaults, then `ANSIBLE_KHEOPS_*`
/// environment overrides, then the added sources in order (later wins).
///
/// # Examples
///
/// ```rust,no_run
/// use kheops_resolver::prelude::*;
/// use serde_json::json;
///
/// # fn example() -> Result<()> {
/// let kheops = KheopsLookup::builder()
///     .with_inline(json!({"instance_log_level": "DEBUG"}))
///     .with_file("site/ansible-kheops.yml")
///     .build(StaticBackend::new())?;
/// # Ok(())
/// # }
/// ```
pub struct KheopsLookupBuilder {
    specs: Vec<SourceSpec>,
    env: Option<EnvSource>,
    custom_sources: Vec<Box<dyn ConfigSource>>,
    invalid: Option<KheopsError>,
}

impl KheopsLookupBuilder {
    /// Create a new builder reading the process environment.
    pub fn new() -> Self {
        Self {
            specs: Vec::new(),
            env: Some(EnvSource::default()),
            custom_sources: Vec::new(),
            invalid: None,
        }
    }

    /// Add a configuration file. It must exist when the session is built.
    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_source_spec(SourceSpec::File(path.into()))
    }

    /// Add an inline mapping.
    ///
    /// Anything but a JSON object makes [`Self::build`] fail with
    /// [`KheopsError::InvalidConfigSource`].
    pub fn with_inline(mut self, values: Value) -> Self {
        match values {
            Value::Object(map) => self.specs.push(SourceSpec::Inline(map)),
            other => {
                self.invalid.get_or_insert(KheopsError::InvalidConfigSource(format!(
                    "inline configuration must be a mapping, got: {}",
                    other
                )));
            }
        }
        self
    }

    /// Add a source entry; [`SourceSpec::Absent`] is skipped.
    pub fn with_source_spec(mut self, spec: impl Into<SourceSpec>) -> Self {
        self.specs.push(spec.into());
        self
    }

    /// Add a custom configuration source at its own priority.
    pub fn with_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
        self.custom_sources.push(Box::new(source));
        self
    }

    /// Replace the environment layer.
    pub fn with_env_overrides(mut self, env: EnvSource) -> Self {
        self.env = Some(env);
        self
    }

    /// Drop the environment layer entirely.
    pub fn without_env(mut self) -> Self {
        self.env = None;
        self
    }

    /// Merge all layers into typed settings without opening a backend.
    ///
    /// # Errors
    ///
    /// Returns any source error and [`KheopsError::InvalidOption`] for
    /// values that do not type-check.
    pub fn resolve(self) -> Result<Settings> {
        if let Some(err) = self.invalid {
            return Err(err);
        }

        let mut resolver = ConfigResolver::layered(self.env, self.specs);
        for source in self.custom_sources {
            resolver.add_source(source);
        }

        Settings::from_map(resolver.resolve()?)
    }

    /// Build the session around an already-open backend.
    ///
    /// # Errors
    ///
    /// Fails with [`KheopsError::UnsupportedMode`] when `mode` is `client`,
    /// and with any configuration error from [`Self::resolve`].
    pub fn build<B: Backend>(self, backend: B) -> Result<KheopsLookup<B>> {
        self.build_with(|_| Ok(backend))
    }

    /// Build the session, opening the backend with `factory`.
    ///
    /// The factory is called once, after the mode check, with the
    /// `instance_*` options.
    ///
    /// # Errors
    ///
    /// Same as [`Self::build`], plus any error returned by the factory.
    pub fn build_with<B, F>(self, factory: F) -> Result<KheopsLookup<B>>
    where
        B: Backend,
        F: FnOnce(&InstanceSettings) -> std::result::Result<B, BackendError>,
    {
        let settings = self.resolve()?;

        if settings.mode == Mode::Client {
            return Err(KheopsError::UnsupportedMode("client".to_string()));
        }

        let instance = InstanceSettings {
            config_path: settings.instance_config.clone(),
            namespace: settings.instance_namespace.clone(),
            log_level: settings.instance_log_level,
            explain: settings.instance_explain,
        };
        let backend = factory(&instance)?;
        tracing::debug!(
            config = ?instance.config_path,
            namespace = ?instance.namespace,
            log_level = %instance.log_level,
            "Kheops instance has been created"
        );

        Ok(KheopsLookup::new(settings, backend))
    }
}

impl Default for KheopsLookupBuilder {
    fn default() -> Self {
        Self::new()
    }
}
