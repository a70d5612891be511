//! Environment variable configuration source.

use super::{ConfigMap, ConfigSource};
use crate::core::schema::ENV_OVERRIDABLE;
use crate::error::{KheopsError, Result};
use config::Environment;
use std::collections::HashMap;

/// Environment variable prefix used by the Ansible plugins.
pub const DEFAULT_ENV_PREFIX: &str = "ANSIBLE_KHEOPS";

/// Environment variable configuration source.
///
/// Reads `PREFIX_<OPTION>` for every option in the environment allow-list.
/// Values are kept as raw strings; variables outside the allow-list are
/// ignored even when they carry the prefix.
///
/// # Examples
///
/// ```rust
/// use kheops_resolver::sources::EnvSource;
///
/// // ANSIBLE_KHEOPS_NAMESPACE=ansible -> namespace = "ansible"
/// let source = EnvSource::new("ANSIBLE_KHEOPS");
/// ```
pub struct EnvSource {
    prefix: String,
    vars: Option<HashMap<String, String>>,
    priority: i32,
}

impl EnvSource {
    /// Create a new environment variable source reading the process environment.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            vars: None,
            priority: 100,
        }
    }

    /// Read from a fixed variable map instead of the process environment.
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Set the priority for this source.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_PREFIX)
    }
}

impl ConfigSource for EnvSource {
    fn load(&self) -> Result<ConfigMap> {
        // No separator and no parsing: ANSIBLE_KHEOPS_INSTANCE_LOG_LEVEL -> instance_log_level
        let mut env_source = Environment::with_prefix(&self.prefix).prefix_separator("_");
        if let Some(vars) = &self.vars {
            env_source = env_source.source(Some(vars.clone().into_iter().collect()));
        }

        let loaded = config::Config::builder()
            .add_source(env_source)
            .build()
            .map_err(|e| {
                KheopsError::ParseError(format!("Failed to load environment variables: {}", e))
            })?;

        let all = loaded.try_deserialize::<ConfigMap>().map_err(|e| {
            KheopsError::ParseError(format!("Failed to parse environment variables: {}", e))
        })?;

        let mut map = ConfigMap::new();
        for option in ENV_OVERRIDABLE {
            if let Some(value) = all.get(*option) {
                tracing::trace!(option, "environment override");
                map.insert(option.to_string(), value.clone());
            }
        }

        Ok(map)
    }

    fn name(&self) -> String {
        format!("env:{}_*", self.prefix)
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
