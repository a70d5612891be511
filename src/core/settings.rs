//! Typed view over the effective configuration.

use crate::core::schema;
use crate::error::{KheopsError, Result};
use crate::sources::ConfigMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// How the plugin reaches Kheops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Open a Kheops instance in-process.
    Instance,
    /// Talk to a remote Kheops server. Not implemented.
    Client,
}

/// Which ScopeBuilder strategy turns the scope spec into a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeStrategy {
    /// Copy each named variable verbatim.
    #[serde(alias = "direct")]
    Vars,
    /// Evaluate each value as a template expression.
    #[serde(alias = "templated")]
    Jinja,
}

/// Whether lookup results go through the template engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsStrategy {
    /// Return results as the backend produced them.
    None,
    /// Render the whole result structure in one template pass.
    #[serde(alias = "templated")]
    Jinja,
}

/// What to do when a scope expression fails to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeErrorPolicy {
    /// Undefined variables abort the scope build; other failures keep the
    /// literal expression.
    #[default]
    Strict,
    /// Every failure is logged and the literal expression is kept.
    Lenient,
}

/// Backend log level, as accepted by `instance_log_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum LogLevel {
    /// DEBUG
    Debug,
    /// INFO
    Info,
    /// WARNING
    Warning,
    /// ERROR
    Error,
}

impl LogLevel {
    /// The matching `tracing` level.
    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            other => Err(format!(
                "unknown log level `{}`, expected DEBUG, INFO, WARNING or ERROR",
                other
            )),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, String> {
        value.parse()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// The effective configuration, with the options the orchestrator needs
/// already checked and typed.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Backend access mode.
    pub mode: Mode,
    /// Path to the backend's own configuration.
    pub instance_config: Option<String>,
    /// Namespace the backend is opened with.
    pub instance_namespace: Option<String>,
    /// Backend log level.
    pub instance_log_level: LogLevel,
    /// Default explain flag passed to the backend.
    pub instance_explain: bool,
    /// Default query namespace.
    pub namespace: String,
    /// Default scope spec.
    pub scope: Option<ConfigMap>,
    /// Default key spec, in any of the accepted shapes.
    pub keys: Option<Value>,
    /// Separator between namespace, key and remap.
    pub key_separator: char,
    /// Scope strategy.
    pub process_scope: ScopeStrategy,
    /// Result post-processing strategy.
    pub process_results: ResultsStrategy,
    /// Scope template failure policy.
    pub scope_error_policy: ScopeErrorPolicy,
    effective: ConfigMap,
}

impl Settings {
    /// Type-check an effective configuration mapping.
    ///
    /// Options missing from the mapping take their schema default.
    ///
    /// # Errors
    ///
    /// Returns [`KheopsError::InvalidOption`] naming the first option whose
    /// value does not fit.
    pub fn from_map(effective: ConfigMap) -> Result<Self> {
        let key_separator = separator(&option::<String>(&effective, "key_separator")?)?;

        Ok(Self {
            mode: option(&effective, "mode")?,
            instance_config: option(&effective, "instance_config")?,
            instance_namespace: option(&effective, "instance_namespace")?,
            instance_log_level: option(&effective, "instance_log_level")?,
            instance_explain: option::<Option<bool>>(&effective, "instance_explain")?
                .unwrap_or(false),
            namespace: option(&effective, "namespace")?,
            scope: scope_spec(&effective)?,
            keys: option::<Value>(&effective, "keys").map(|v| (!v.is_null()).then_some(v))?,
            key_separator,
            process_scope: option(&effective, "process_scope")?,
            process_results: option(&effective, "process_results")?,
            scope_error_policy: option(&effective, "scope_error_policy")?,
            effective,
        })
    }

    /// The merged, untyped configuration this view was built from.
    pub fn effective(&self) -> &ConfigMap {
        &self.effective
    }
}

fn option<T: DeserializeOwned>(map: &ConfigMap, name: &str) -> Result<T> {
    let value = map
        .get(name)
        .cloned()
        .unwrap_or_else(|| schema::default_value(name));
    serde_json::from_value(value).map_err(|e| KheopsError::invalid_option(name, e.to_string()))
}

fn separator(raw: &str) -> Result<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(sep), None) => Ok(sep),
        _ => Err(KheopsError::invalid_option(
            "key_separator",
            format!("expected a single character, got `{}`", raw),
        )),
    }
}

/// The scope option may arrive as an inline YAML string from the environment.
fn scope_spec(map: &ConfigMap) -> Result<Option<ConfigMap>> {
    match option::<Value>(map, "scope")? {
        Value::Null => Ok(None),
        Value::Object(spec) => Ok(Some(spec)),
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => serde_yaml::from_str::<ConfigMap>(&text)
            .map(Some)
            .map_err(|e| KheopsError::invalid_option("scope", e.to_string())),
        other => Err(KheopsError::invalid_option(
            "scope",
            format!("expected a mapping, got {}", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(value: Value) -> Result<Settings> {
        let mut map = schema::defaults();
        if let Value::Object(overrides) = value {
            map.extend(overrides);
        }
        Settings::from_map(map)
    }

    #[test]
    fn test_defaults() {
        let s = settings(json!({})).unwrap();
        assert_eq!(s.mode, Mode::Instance);
        assert_eq!(s.namespace, "default");
        assert_eq!(s.instance_log_level, LogLevel::Warning);
        assert!(!s.instance_explain);
        assert_eq!(s.key_separator, '/');
        assert_eq!(s.process_scope, ScopeStrategy::Jinja);
        assert_eq!(s.process_results, ResultsStrategy::None);
        assert_eq!(s.scope_error_policy, ScopeErrorPolicy::Strict);
        assert!(s.keys.is_none());
        assert_eq!(
            s.scope.unwrap()["node"],
            json!("inventory_hostname")
        );
    }

    #[test]
    fn test_strategy_aliases() {
        let s = settings(json!({"process_scope": "direct", "process_results": "templated"})).unwrap();
        assert_eq!(s.process_scope, ScopeStrategy::Vars);
        assert_eq!(s.process_results, ResultsStrategy::Jinja);
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        let s = settings(json!({"instance_log_level": "debug"})).unwrap();
        assert_eq!(s.instance_log_level, LogLevel::Debug);
        assert_eq!(s.instance_log_level.as_tracing_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_level_try_from_string() {
        assert_eq!(LogLevel::try_from("Error".to_string()), Ok(LogLevel::Error));
        assert_eq!(LogLevel::try_from("warn".to_string()), Ok(LogLevel::Warning));
        assert!(LogLevel::try_from("verbose".to_string()).is_err());
    }

    #[test]
    fn test_invalid_option_is_named() {
        let err = settings(json!({"mode": "remote"})).unwrap_err();
        assert!(matches!(err, KheopsError::InvalidOption { ref option, .. } if option == "mode"));

        let err = settings(json!({"key_separator": "::"})).unwrap_err();
        assert!(matches!(err, KheopsError::InvalidOption { ref option, .. } if option == "key_separator"));
    }

    #[test]
    fn test_scope_from_yaml_string() {
        let s = settings(json!({"scope": "{node: inventory_hostname, env: stage}"})).unwrap();
        let scope = s.scope.unwrap();
        assert_eq!(scope["env"], json!("stage"));
    }

    #[test]
    fn test_null_explain_is_false() {
        let s = settings(json!({"instance_explain": null})).unwrap();
        assert!(!s.instance_explain);
    }
}
