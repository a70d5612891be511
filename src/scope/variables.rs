//! Variable source collaborator.

use crate::sources::ConfigMap;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// The caller's named values (host facts, inventory variables, ...).
pub trait VariableSource {
    /// Look up one variable by name.
    fn get(&self, name: &str) -> Option<Value>;

    /// An owned copy of every variable, used as a template context.
    fn snapshot(&self) -> ConfigMap;
}

impl VariableSource for ConfigMap {
    fn get(&self, name: &str) -> Option<Value> {
        ConfigMap::get(self, name).cloned()
    }

    fn snapshot(&self) -> ConfigMap {
        self.clone()
    }
}

impl<S: std::hash::BuildHasher> VariableSource for HashMap<String, Value, S> {
    fn get(&self, name: &str) -> Option<Value> {
        HashMap::get(self, name).cloned()
    }

    fn snapshot(&self) -> ConfigMap {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl VariableSource for BTreeMap<String, Value> {
    fn get(&self, name: &str) -> Option<Value> {
        BTreeMap::get(self, name).cloned()
    }

    fn snapshot(&self) -> ConfigMap {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

/// Nothing defined. Useful when the scope is given explicitly.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVariables;

impl VariableSource for NoVariables {
    fn get(&self, _name: &str) -> Option<Value> {
        None
    }

    fn snapshot(&self) -> ConfigMap {
        ConfigMap::new()
    }
}
