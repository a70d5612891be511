//! Integration tests for configuration layering.

use kheops_resolver::core::schema;
use kheops_resolver::prelude::*;
use kheops_resolver::sources::EnvSource;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn env(vars: &[(&str, &str)]) -> EnvSource {
    EnvSource::default().with_vars(vars.iter().copied())
}

#[test]
fn test_defaults_only() {
    let settings = KheopsLookup::builder().with_env_overrides(env(&[])).resolve().unwrap();

    assert_eq!(settings.namespace, "default");
    assert_eq!(settings.instance_config.as_deref(), Some("site/kheops.yml"));
    assert_eq!(settings.process_scope, ScopeStrategy::Jinja);
    assert_eq!(settings.process_results, ResultsStrategy::None);
    for option in schema::OPTIONS {
        assert!(settings.effective().contains_key(option.name));
    }
}

#[test]
fn test_load_single_yaml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("ansible-kheops.yml");

    fs::write(
        &config_path,
        r#"
namespace: ansible
instance_config: inventory/kheops.yml
scope:
  fqdn: inventory_hostname
  hostgroup: foreman_hostgroup_title
keys:
  - profile
  - role
"#,
    )
    .unwrap();

    let settings = KheopsLookup::builder()
        .with_env_overrides(env(&[]))
        .with_file(&config_path)
        .resolve()
        .unwrap();

    assert_eq!(settings.namespace, "ansible");
    assert_eq!(settings.instance_config.as_deref(), Some("inventory/kheops.yml"));
    assert_eq!(
        settings.scope.unwrap(),
        *json!({"fqdn": "inventory_hostname", "hostgroup": "foreman_hostgroup_title"})
            .as_object()
            .unwrap()
    );
    assert_eq!(settings.keys, Some(json!(["profile", "role"])));
}

#[test]
fn test_later_sources_win() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("kheops.yml");
    fs::write(&config_path, "namespace: from_file\ninstance_log_level: ERROR\n").unwrap();

    let settings = KheopsLookup::builder()
        .with_env_overrides(env(&[]))
        .with_inline(json!({"namespace": "from_inline", "instance_log_level": "DEBUG"}))
        .with_file(&config_path)
        .with_inline(json!({"namespace": "last"}))
        .resolve()
        .unwrap();

    assert_eq!(settings.namespace, "last");
    assert_eq!(settings.instance_log_level.to_string(), "ERROR");
}

#[test]
fn test_env_overrides_defaults_but_not_sources() {
    let settings = KheopsLookup::builder()
        .with_env_overrides(env(&[
            ("ANSIBLE_KHEOPS_NAMESPACE", "from_env"),
            ("ANSIBLE_KHEOPS_INSTANCE_NAMESPACE", "site"),
        ]))
        .with_inline(json!({"namespace": "from_source"}))
        .resolve()
        .unwrap();

    assert_eq!(settings.namespace, "from_source");
    assert_eq!(settings.instance_namespace.as_deref(), Some("site"));
}

#[test]
fn test_unlisted_env_var_has_no_effect() {
    let baseline = KheopsLookup::builder().with_env_overrides(env(&[])).resolve().unwrap();
    let with_unlisted = KheopsLookup::builder()
        .with_env_overrides(env(&[
            ("ANSIBLE_KHEOPS_PROCESS_RESULTS", "jinja"),
            ("ANSIBLE_KHEOPS_KEY_SEPARATOR", ":"),
        ]))
        .resolve()
        .unwrap();

    assert_eq!(baseline.effective(), with_unlisted.effective());
}

#[test]
fn test_env_scope_is_parsed_as_inline_yaml() {
    let settings = KheopsLookup::builder()
        .with_env_overrides(env(&[("ANSIBLE_KHEOPS_SCOPE", "{node: inventory_hostname}")]))
        .resolve()
        .unwrap();

    assert_eq!(settings.scope.unwrap()["node"], json!("inventory_hostname"));
}

#[test]
fn test_missing_file_fails() {
    let err = KheopsLookup::builder()
        .without_env()
        .with_file("/nonexistent/ansible-kheops.yml")
        .resolve()
        .unwrap_err();

    assert!(matches!(err, KheopsError::ConfigSourceNotFound(_)));
}

#[test]
fn test_non_mapping_document_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("kheops.json");
    fs::write(&config_path, "[1, 2, 3]").unwrap();

    let result = KheopsLookup::builder()
        .without_env()
        .with_file(&config_path)
        .resolve();

    assert!(result.is_err());
}

#[test]
fn test_source_specs_from_loose_values() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("kheops.yml");
    fs::write(&config_path, "namespace: from_file\n").unwrap();

    let mut builder = KheopsLookup::builder().without_env();
    for value in [json!(null), json!(config_path.to_str().unwrap()), json!({"keys": "role"})] {
        builder = builder.with_source_spec(SourceSpec::from_value(value).unwrap());
    }
    let settings = builder.resolve().unwrap();

    assert_eq!(settings.namespace, "from_file");
    assert_eq!(settings.keys, Some(json!("role")));
    assert!(matches!(
        SourceSpec::from_value(json!(42)),
        Err(KheopsError::InvalidConfigSource(_))
    ));
}

#[test]
fn test_client_mode_is_unsupported() {
    let result = KheopsLookup::builder()
        .with_env_overrides(env(&[("ANSIBLE_KHEOPS_MODE", "client")]))
        .build(StaticBackend::new());

    assert!(matches!(result, Err(KheopsError::UnsupportedMode(_))));
}

#[test]
fn test_file_keys_keep_their_case() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("kheops.yml");
    fs::write(
        &config_path,
        "scope:\n  nodeName: inventory_hostname\nkeys:\n  MyKey: site\n",
    )
    .unwrap();

    let settings = KheopsLookup::builder()
        .without_env()
        .with_file(&config_path)
        .resolve()
        .unwrap();

    assert_eq!(settings.scope.unwrap()["nodeName"], json!("inventory_hostname"));
    assert_eq!(settings.keys, Some(json!({"MyKey": "site"})));
}

#[test]
fn test_config_option_pulls_in_extra_file() {
    let temp_dir = TempDir::new().unwrap();
    let extra = temp_dir.path().join("extra.yml");
    fs::write(&extra, "namespace: from_extra\n").unwrap();

    let settings = KheopsLookup::builder()
        .without_env()
        .with_inline(json!({"config": extra.to_str().unwrap()}))
        .resolve()
        .unwrap();
    assert_eq!(settings.namespace, "from_extra");

    let settings = KheopsLookup::builder()
        .without_env()
        .with_inline(json!({"config": extra.to_str().unwrap()}))
        .with_inline(json!({"namespace": "later"}))
        .resolve()
        .unwrap();
    assert_eq!(settings.namespace, "later");
}
