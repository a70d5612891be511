use super::{Backend, BackendError};
use crate::sources::ConfigMap;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// One recorded `(keys, scope, explain)` call.
pub type RecordedRequest = (Vec<String>, ConfigMap, bool);

/// An in-memory backend answering from a fixed table.
///
/// Values are keyed by fully-qualified key and do not depend on the scope.
/// Every request is recorded so callers can check what was asked.
#[derive(Debug, Clone, Default)]
pub struct StaticBackend {
    values: ConfigMap,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StaticBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `key` with `value`.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// The `(keys, scope, explain)` triples received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Backend for StaticBackend {
    fn lookup(
        &self,
        keys: &[String],
        scope: &ConfigMap,
        explain: bool,
    ) -> Result<ConfigMap, BackendError> {
        self.requests
            .lock()
            .map_err(|e| BackendError::Lookup(format!("request log poisoned: {}", e)))?
            .push((keys.to_vec(), scope.clone(), explain));

        let found: ConfigMap = keys
            .iter()
            .filter_map(|key| self.values.get(key).map(|v| (key.clone(), v.clone())))
            .collect();

        if explain {
            for key in keys {
                tracing::info!(%key, found = found.contains_key(key), "explain");
            }
        }
        Ok(found)
    }
}
