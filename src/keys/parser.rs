//! Normalization of the accepted key-spec shapes.

use super::KeySpec;
use crate::error::{KheopsError, Result};
use serde_json::Value;

/// Parses key-spec inputs into [`KeySpec`]s.
///
/// Accepted item shapes are a `"namespace<sep>key<sep>remap"` string (the
/// namespace and remap segments are optional) and a `{key, remap,
/// namespace}` mapping. A key-spec input is one item, a sequence of items,
/// or a mapping of `key -> namespace suffix`. A mapping carrying a string
/// `key` entry is always read as a single item.
#[derive(Debug, Clone, Copy)]
pub struct KeySpecParser {
    separator: char,
}

impl KeySpecParser {
    /// Create a parser splitting on `separator`.
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    /// The configured separator.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Parse a single string or mapping item.
    pub fn parse_one(&self, item: &Value, default_namespace: &str) -> Result<KeySpec> {
        match item {
            Value::String(text) => Ok(self.parse_str(text, default_namespace)),
            Value::Object(map) => {
                let key = match map.get("key") {
                    Some(Value::String(key)) => key.clone(),
                    _ => {
                        return Err(KheopsError::InvalidKeySpec(format!(
                            "mapping needs a string `key`: {}",
                            item
                        )));
                    }
                };
                let remap = optional_str(map.get("remap"), "remap", item)?.unwrap_or(key.as_str());
                let namespace =
                    optional_str(map.get("namespace"), "namespace", item)?.unwrap_or(default_namespace);

                Ok(KeySpec {
                    remap: Some(remap.to_string()),
                    namespace: namespace.to_string(),
                    key,
                })
            }
            other => Err(KheopsError::InvalidKeySpec(other.to_string())),
        }
    }

    /// Parse a `namespace<sep>key<sep>remap` string into at most three parts.
    pub fn parse_str(&self, text: &str, default_namespace: &str) -> KeySpec {
        let mut parts = text.splitn(3, self.separator);
        let first = parts.next().unwrap_or_default();
        match parts.next() {
            None => KeySpec::new(first, default_namespace),
            Some(key) => KeySpec {
                key: key.to_string(),
                namespace: first.to_string(),
                remap: parts.next().map(str::to_string),
            },
        }
    }

    /// Parse any accepted key-spec input, preserving order.
    pub fn parse_many(&self, data: &Value, default_namespace: &str) -> Result<Vec<KeySpec>> {
        match data {
            Value::String(_) => Ok(vec![self.parse_one(data, default_namespace)?]),
            Value::Array(items) => items
                .iter()
                .map(|item| self.parse_one(item, default_namespace))
                .collect(),
            // A mapping with a string `key` is one item, not the shorthand
            Value::Object(map) if matches!(map.get("key"), Some(Value::String(_))) => {
                Ok(vec![self.parse_one(data, default_namespace)?])
            }
            Value::Object(map) => map
                .iter()
                .map(|(key, suffix)| match suffix {
                    Value::String(suffix) if !suffix.is_empty() => Ok(self.parse_str(
                        &format!("{}{}{}", key, self.separator, suffix),
                        default_namespace,
                    )),
                    Value::String(_) | Value::Null | Value::Bool(false) => {
                        Ok(self.parse_str(key, default_namespace))
                    }
                    other => Err(KheopsError::InvalidKeySpec(format!(
                        "need a string for `{}`, got: {}",
                        key, other
                    ))),
                })
                .collect(),
            other => Err(KheopsError::InvalidKeySpec(other.to_string())),
        }
    }
}

impl Default for KeySpecParser {
    fn default() -> Self {
        Self::new(super::DEFAULT_SEPARATOR)
    }
}

fn optional_str<'a>(value: Option<&'a Value>, field: &str, item: &Value) -> Result<Option<&'a str>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(_) => Err(KheopsError::InvalidKeySpec(format!(
            "`{}` must be a string in {}",
            field, item
        ))),
    }
}
