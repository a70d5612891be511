//! Declared plugin options and their defaults.

use crate::sources::ConfigMap;
use serde_json::{Value, json};

/// One recognized configuration option.
#[derive(Debug, Clone, Copy)]
pub struct OptionDef {
    /// Option name as it appears in configuration documents.
    pub name: &'static str,
    /// Short human description.
    pub description: &'static str,
}

/// Every option the resolver knows about, in documentation order.
pub const OPTIONS: &[OptionDef] = &[
    OptionDef {
        name: "config",
        description: "Path to an extra configuration file merged right above the source setting it",
    },
    OptionDef {
        name: "mode",
        description: "`instance` to query Kheops directly, `client` for a remote server",
    },
    OptionDef {
        name: "instance_config",
        description: "The Kheops configuration file to use",
    },
    OptionDef {
        name: "instance_namespace",
        description: "Namespace the Kheops instance is opened with",
    },
    OptionDef {
        name: "instance_log_level",
        description: "Kheops logging level (DEBUG, INFO, WARNING, ERROR)",
    },
    OptionDef {
        name: "instance_explain",
        description: "Ask the backend to explain how values were resolved",
    },
    OptionDef {
        name: "namespace",
        description: "Default namespace for lookups",
    },
    OptionDef {
        name: "scope",
        description: "Scope spec: scope field -> variable name or template expression",
    },
    OptionDef {
        name: "keys",
        description: "Default key spec",
    },
    OptionDef {
        name: "key_separator",
        description: "Single character between namespace, key and remap",
    },
    OptionDef {
        name: "process_scope",
        description: "`vars` for plain variable lookup, `jinja` for template evaluation",
    },
    OptionDef {
        name: "process_results",
        description: "`none` to return results as-is, `jinja` to template them",
    },
    OptionDef {
        name: "scope_error_policy",
        description: "`strict` to abort on undefined scope variables, `lenient` to keep the expression",
    },
];

/// Options that `ANSIBLE_KHEOPS_<NAME>` environment variables may override.
pub const ENV_OVERRIDABLE: &[&str] = &[
    "mode",
    "instance_config",
    "instance_namespace",
    "instance_log_level",
    "namespace",
    "scope",
    "keys",
];

/// Default value of a declared option, `null` when none is declared.
pub fn default_value(name: &str) -> Value {
    match name {
        "mode" => json!("instance"),
        "instance_config" => json!("site/kheops.yml"),
        "instance_namespace" => json!("default"),
        "instance_log_level" => json!("WARNING"),
        "instance_explain" => json!(false),
        "namespace" => json!("default"),
        "scope" => json!({
            "node": "inventory_hostname",
            "groups": "group_names",
        }),
        "key_separator" => json!("/"),
        "process_scope" => json!("jinja"),
        "process_results" => json!("none"),
        "scope_error_policy" => json!("strict"),
        _ => Value::Null,
    }
}

/// One flat mapping with an entry for every declared option.
pub fn defaults() -> ConfigMap {
    OPTIONS
        .iter()
        .map(|option| (option.name.to_string(), default_value(option.name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overridable_are_declared() {
        for name in ENV_OVERRIDABLE {
            assert!(OPTIONS.iter().any(|o| o.name == *name), "{name} undeclared");
        }
    }

    #[test]
    fn test_undeclared_defaults_are_null() {
        let map = defaults();
        assert_eq!(map["config"], Value::Null);
        assert_eq!(map["keys"], Value::Null);
        assert_eq!(map["mode"], json!("instance"));
        assert_eq!(map.len(), OPTIONS.len());
    }
}
