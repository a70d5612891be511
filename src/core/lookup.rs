//! Query orchestration: keys and scope in, remapped backend results out.

use crate::backend::Backend;
use crate::core::{ResultsStrategy, ScopeStrategy, Settings};
use crate::error::{KheopsError, Result};
use crate::keys::{KeySpec, KeySpecParser};
use crate::scope::{ScopeBuilder, VariableSource};
use crate::sources::ConfigMap;
use crate::template::{RenderOptions, TemplateEngine, TemplateError};
use serde_json::Value;

/// Per-call overrides for a lookup. Unset fields fall back to configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupRequest {
    /// Key spec in any accepted shape.
    pub keys: Option<Value>,
    /// Namespace for keys that do not carry one.
    pub namespace: Option<String>,
    /// Scope for [`KheopsLookup::lookup`], scope spec for
    /// [`KheopsLookup::super_lookup`].
    pub scope: Option<ConfigMap>,
    /// Explain flag passed to the backend.
    pub explain: Option<bool>,
}

impl LookupRequest {
    /// An empty request: everything comes from configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the keys to resolve.
    pub fn with_keys(mut self, keys: impl Into<Value>) -> Self {
        self.keys = Some(keys.into());
        self
    }

    /// Set the default namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the scope (or scope spec).
    pub fn with_scope(mut self, scope: ConfigMap) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Set the explain flag.
    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = Some(explain);
        self
    }
}

/// The caller-side collaborators of a [`KheopsLookup::super_lookup`] call.
#[derive(Clone, Copy)]
pub struct LookupContext<'a> {
    variables: &'a dyn VariableSource,
    templates: Option<&'a dyn TemplateEngine>,
    process_scope: Option<ScopeStrategy>,
    process_results: Option<ResultsStrategy>,
}

impl<'a> LookupContext<'a> {
    /// Use `variables` to build scopes and as the result template context.
    pub fn new(variables: &'a dyn VariableSource) -> Self {
        Self {
            variables,
            templates: None,
            process_scope: None,
            process_results: None,
        }
    }

    /// Provide the template engine for templated strategies.
    pub fn with_templates(mut self, templates: &'a dyn TemplateEngine) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Override the configured scope strategy.
    pub fn with_process_scope(mut self, strategy: ScopeStrategy) -> Self {
        self.process_scope = Some(strategy);
        self
    }

    /// Override the configured result strategy.
    pub fn with_process_results(mut self, strategy: ResultsStrategy) -> Self {
        self.process_results = Some(strategy);
        self
    }

    fn engine(&self, purpose: &'static str) -> Result<&'a dyn TemplateEngine> {
        self.templates
            .ok_or(KheopsError::MissingTemplateEngine(purpose))
    }
}

/// A configured Kheops lookup session.
///
/// Built once through [`KheopsLookup::builder`] and immutable afterwards;
/// every call is independent.
///
/// # Examples
///
/// ```rust
/// use kheops_resolver::prelude::*;
/// use serde_json::json;
///
/// # fn example() -> Result<()> {
/// let backend = StaticBackend::new().with_value("default/role", "web");
/// let kheops = KheopsLookup::builder()
///     .without_env()
///     .with_inline(json!({"namespace": "default"}))
///     .build(backend)?;
///
/// let result = kheops.lookup(&LookupRequest::new().with_keys("role"))?;
/// assert_eq!(result["default/role"], "web");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct KheopsLookup<B> {
    settings: Settings,
    backend: B,
    parser: KeySpecParser,
    scopes: ScopeBuilder,
}

impl<B: Backend> KheopsLookup<B> {
    pub(crate) fn new(settings: Settings, backend: B) -> Self {
        let parser = KeySpecParser::new(settings.key_separator);
        let scopes = ScopeBuilder::new(settings.scope_error_policy);
        Self {
            settings,
            backend,
            parser,
            scopes,
        }
    }

    /// The effective configuration.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The backend this session queries.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resolve keys with an already-built scope.
    ///
    /// Missing request fields fall back to the configured `namespace`,
    /// `scope` and `keys`.
    ///
    /// # Errors
    ///
    /// Fails with [`KheopsError::InvalidKeySpec`] for malformed or missing
    /// keys; backend errors propagate unchanged.
    pub fn lookup(&self, request: &LookupRequest) -> Result<ConfigMap> {
        let scope = request
            .scope
            .as_ref()
            .filter(|scope| !scope.is_empty())
            .or(self.settings.scope.as_ref())
            .cloned()
            .unwrap_or_default();
        self.query(request, &scope)
    }

    /// Build the scope from the caller's variables, run [`Self::lookup`],
    /// then optionally template the results.
    ///
    /// `request.scope`, when set, is a scope spec rather than a scope.
    ///
    /// # Errors
    ///
    /// Fails with [`KheopsError::MissingTemplateEngine`] when a templated
    /// strategy is active without an engine, and with the errors of
    /// [`ScopeBuilder::from_template`] and [`Self::lookup`].
    pub fn super_lookup(&self, request: &LookupRequest, context: &LookupContext<'_>) -> Result<ConfigMap> {
        let scope = self.build_scope(request.scope.as_ref(), context)?;
        let result = self.query(request, &scope)?;
        self.process_results(result, context)
    }

    /// Resolve each term on its own and return the first value of each
    /// result, in term order. Terms the backend cannot resolve yield `null`.
    ///
    /// The scope is built once for all terms from the configured scope spec.
    pub fn lookup_terms(&self, terms: &[Value], context: &LookupContext<'_>) -> Result<Vec<Value>> {
        let scope = self.build_scope(None, context)?;

        terms
            .iter()
            .map(|term| {
                let request = LookupRequest::new().with_keys(term.clone());
                let result = self.process_results(self.query(&request, &scope)?, context)?;
                Ok(result.into_iter().next().map_or(Value::Null, |(_, value)| value))
            })
            .collect()
    }

    /// Run [`Self::super_lookup`] with configured keys and scope for each
    /// host, returning the variables to assign to it.
    pub fn resolve_hosts<I, N, V>(
        &self,
        hosts: I,
        templates: Option<&dyn TemplateEngine>,
    ) -> Result<Vec<(String, ConfigMap)>>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: VariableSource,
    {
        let request = LookupRequest::new();
        hosts
            .into_iter()
            .map(|(name, variables)| {
                let name = name.into();
                let mut context = LookupContext::new(&variables);
                if let Some(templates) = templates {
                    context = context.with_templates(templates);
                }
                let vars = self.super_lookup(&request, &context)?;
                for (key, value) in &vars {
                    tracing::debug!(host = %name, %key, %value, "define variable");
                }
                Ok((name, vars))
            })
            .collect()
    }

    fn build_scope(&self, spec: Option<&ConfigMap>, context: &LookupContext<'_>) -> Result<ConfigMap> {
        let empty = ConfigMap::new();
        let spec = spec
            .filter(|spec| !spec.is_empty())
            .or(self.settings.scope.as_ref())
            .unwrap_or(&empty);

        match context.process_scope.unwrap_or(self.settings.process_scope) {
            ScopeStrategy::Vars => Ok(ScopeBuilder::from_variables(spec, context.variables)),
            ScopeStrategy::Jinja => {
                let engine = context.engine("evaluate scope expressions")?;
                self.scopes.from_template(spec, context.variables, engine)
            }
        }
    }

    fn query(&self, request: &LookupRequest, scope: &ConfigMap) -> Result<ConfigMap> {
        let namespace = request
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(&self.settings.namespace);
        let keys = request
            .keys
            .as_ref()
            .filter(|keys| !is_blank(keys))
            .or(self.settings.keys.as_ref())
            .ok_or_else(|| KheopsError::InvalidKeySpec("no keys requested or configured".to_string()))?;

        let specs = self.parser.parse_many(keys, namespace)?;
        let separator = self.parser.separator();
        let query_keys: Vec<String> = specs.iter().map(|spec| spec.qualified(separator)).collect();
        let explain = request.explain.unwrap_or(self.settings.instance_explain);

        tracing::debug!(keys = ?query_keys, "Kheops keys");
        tracing::debug!(?scope, explain, "Kheops scope");

        let raw = self.backend.lookup(&query_keys, scope, explain)?;
        Ok(remap(raw, &specs, separator))
    }

    fn process_results(&self, result: ConfigMap, context: &LookupContext<'_>) -> Result<ConfigMap> {
        match context.process_results.unwrap_or(self.settings.process_results) {
            ResultsStrategy::None => Ok(result),
            ResultsStrategy::Jinja => {
                let engine = context.engine("render lookup results")?;
                let variables = context.variables.snapshot();
                // One pass over the whole structure, not one per value
                match engine
                    .render_value(&Value::Object(result), &variables, RenderOptions::RESULTS)
                    .map_err(KheopsError::ResultTemplateError)?
                {
                    Value::Object(rendered) => Ok(rendered),
                    other => Err(KheopsError::ResultTemplateError(TemplateError::Render(
                        format!("expected a mapping back, got {}", other),
                    ))),
                }
            }
        }
    }
}

impl KheopsLookup<()> {
    /// Create a new builder for constructing a lookup session.
    pub fn builder() -> crate::core::KheopsLookupBuilder {
        crate::core::KheopsLookupBuilder::new()
    }
}

/// Rename remapped keys of a raw backend response.
///
/// Each spec takes its value from the response as returned, under its
/// qualified name or, failing that, its bare name; renamed values never
/// feed another spec. Last rename wins on collisions.
fn remap(raw: ConfigMap, specs: &[KeySpec], separator: char) -> ConfigMap {
    let mut moves = Vec::new();
    for spec in specs {
        let Some(target) = spec.rename() else {
            continue;
        };
        let qualified = spec.qualified(separator);
        let source = if raw.contains_key(&qualified) {
            qualified
        } else if raw.contains_key(&spec.key) {
            spec.key.clone()
        } else {
            tracing::trace!(key = %qualified, "nothing to remap");
            continue;
        };
        tracing::trace!(from = %source, to = target, "transformed");
        moves.push((source, target));
    }

    let mut renamed = ConfigMap::new();
    for (source, target) in &moves {
        if let Some(value) = raw.get(source) {
            renamed.insert(target.to_string(), value.clone());
        }
    }

    let mut result: ConfigMap = raw
        .into_iter()
        .filter(|(key, _)| !moves.iter().any(|(source, _)| source == key))
        .collect();
    result.extend(renamed);
    result
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StaticBackend;
    use crate::core::KheopsLookupBuilder;
    use crate::scope::NoVariables;
    use crate::template::PathTemplateEngine;
    use serde_json::json;

    fn map(value: Value) -> ConfigMap {
        match value {
            Value::Object(map) => map,
            other => panic!("not a mapping: {other}"),
        }
    }

    fn session(config: Value, backend: StaticBackend) -> KheopsLookup<StaticBackend> {
        KheopsLookupBuilder::new()
            .without_env()
            .with_inline(config)
            .build(backend)
            .unwrap()
    }

    #[test]
    fn test_remap_prefers_qualified_key() {
        let raw = map(json!({"default/role": "web"}));
        let specs = [KeySpec::new("role", "default").with_remap("server_role")];
        assert_eq!(remap(raw, &specs, '/'), map(json!({"server_role": "web"})));
    }

    #[test]
    fn test_remap_falls_back_to_bare_key() {
        let raw = map(json!({"x": 1}));
        let specs = [KeySpec::new("x", "default").with_remap("y")];
        assert_eq!(remap(raw, &specs, '/'), map(json!({"y": 1})));
    }

    #[test]
    fn test_remap_skips_absent_and_identity() {
        let raw = map(json!({"default/role": "web"}));
        let specs = [
            KeySpec::new("role", "default").with_remap("role"),
            KeySpec::new("profile", "default").with_remap("server_profile"),
        ];
        assert_eq!(remap(raw, &specs, '/'), map(json!({"default/role": "web"})));
    }

    #[test]
    fn test_remap_never_reads_renamed_values() {
        let raw = map(json!({"a/x": "from_a_x"}));
        let specs = [
            KeySpec::new("x", "a").with_remap("role"),
            KeySpec::new("role", "b").with_remap("other"),
        ];
        assert_eq!(remap(raw, &specs, '/'), map(json!({"role": "from_a_x"})));
    }

    #[test]
    fn test_remap_uses_configured_separator() {
        let raw = map(json!({"ansible:role": "db", "ansible/role": "wrong"}));
        let specs = [KeySpec::new("role", "ansible").with_remap("server_role")];
        assert_eq!(
            remap(raw, &specs, ':'),
            map(json!({"ansible/role": "wrong", "server_role": "db"}))
        );
    }

    #[test]
    fn test_remap_collision_last_spec_wins() {
        let backend = StaticBackend::new()
            .with_value("a/x", "first")
            .with_value("b/y", "second");
        let kheops = session(json!({}), backend);

        let result = kheops
            .lookup(&LookupRequest::new().with_keys(json!(["a/x/target", "b/y/target"])))
            .unwrap();
        assert_eq!(result, map(json!({"target": "second"})));

        let result = kheops
            .lookup(&LookupRequest::new().with_keys(json!(["b/y/target", "a/x/target"])))
            .unwrap();
        assert_eq!(result, map(json!({"target": "first"})));
    }

    #[test]
    fn test_lookup_remap_chain_keeps_first_value() {
        let backend = StaticBackend::new().with_value("a/x", "from_a_x");
        let kheops = session(json!({}), backend);

        let result = kheops
            .lookup(&LookupRequest::new().with_keys(json!(["a/x/role", "b/role/other"])))
            .unwrap();
        assert_eq!(result, map(json!({"role": "from_a_x"})));
    }

    #[test]
    fn test_lookup_uses_configured_defaults() {
        let backend = StaticBackend::new().with_value("ansible/role", "db");
        let kheops = session(
            json!({"namespace": "ansible", "keys": "role", "scope": {"node": "host1"}}),
            backend,
        );

        let result = kheops.lookup(&LookupRequest::new()).unwrap();
        assert_eq!(result, map(json!({"ansible/role": "db"})));

        let requests = kheops.backend().requests();
        assert_eq!(requests[0].1, map(json!({"node": "host1"})));
        assert!(!requests[0].2);
    }

    #[test]
    fn test_lookup_without_keys_fails() {
        let kheops = session(json!({}), StaticBackend::new());
        assert!(matches!(
            kheops.lookup(&LookupRequest::new()),
            Err(KheopsError::InvalidKeySpec(_))
        ));
    }

    #[test]
    fn test_explain_flag_resolution() {
        let kheops = session(json!({"instance_explain": true, "keys": "a"}), StaticBackend::new());
        kheops.lookup(&LookupRequest::new()).unwrap();
        kheops.lookup(&LookupRequest::new().with_explain(false)).unwrap();

        let requests = kheops.backend().requests();
        assert!(requests[0].2);
        assert!(!requests[1].2);
    }

    #[test]
    fn test_templated_scope_requires_engine() {
        let kheops = session(json!({"process_scope": "jinja", "keys": "a"}), StaticBackend::new());
        let err = kheops
            .super_lookup(&LookupRequest::new(), &LookupContext::new(&NoVariables))
            .unwrap_err();
        assert!(matches!(err, KheopsError::MissingTemplateEngine(_)));
    }

    #[test]
    fn test_super_lookup_renders_results() {
        let backend = StaticBackend::new()
            .with_value("default/motd", "Welcome to {{ inventory_hostname }}")
            .with_value("default/ports", json!([22, "{{ ssh_port }}"]));
        let kheops = session(
            json!({"process_scope": "vars", "process_results": "jinja", "keys": ["motd", "ports"]}),
            backend,
        );
        let vars = map(json!({"inventory_hostname": "host1", "ssh_port": "2222"}));

        let result = kheops
            .super_lookup(
                &LookupRequest::new(),
                &LookupContext::new(&vars).with_templates(&PathTemplateEngine),
            )
            .unwrap();
        assert_eq!(result["default/motd"], json!("Welcome to host1"));
        assert_eq!(result["default/ports"], json!([22, "2222"]));
    }

    #[test]
    fn test_context_overrides_configured_strategy() {
        let backend = StaticBackend::new().with_value("default/a", "{{ missing }}");
        let kheops = session(
            json!({"process_scope": "jinja", "process_results": "jinja", "keys": "a"}),
            backend,
        );
        let context = LookupContext::new(&NoVariables)
            .with_process_scope(ScopeStrategy::Vars)
            .with_process_results(ResultsStrategy::None);

        let result = kheops.super_lookup(&LookupRequest::new(), &context).unwrap();
        assert_eq!(result["default/a"], json!("{{ missing }}"));
    }

    #[test]
    fn test_lookup_terms_takes_first_value_per_term() {
        let backend = StaticBackend::new()
            .with_value("ansible/yum_packages", json!(["vim"]))
            .with_value("ansible/yum_repos", json!(["epel"]));
        let kheops = session(json!({"process_scope": "vars"}), backend);

        let values = kheops
            .lookup_terms(
                &[json!("ansible/yum_packages"), json!("ansible/yum_repos"), json!("ansible/nope")],
                &LookupContext::new(&NoVariables),
            )
            .unwrap();
        assert_eq!(values, vec![json!(["vim"]), json!(["epel"]), Value::Null]);
        assert_eq!(kheops.backend().requests().len(), 3);
    }
}
