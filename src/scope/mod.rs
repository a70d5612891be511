//! Scope derivation from a scope spec and the caller's variables.
//!
//! A scope spec maps each scope field to either a variable name (direct
//! strategy) or a template expression (templated strategy).

mod variables;

pub use variables::{NoVariables, VariableSource};

use crate::core::ScopeErrorPolicy;
use crate::error::{KheopsError, Result};
use crate::sources::ConfigMap;
use crate::template::{RenderOptions, TemplateEngine};
use serde_json::Value;

/// Builds concrete scopes with a fixed template failure policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScopeBuilder {
    policy: ScopeErrorPolicy,
}

impl ScopeBuilder {
    /// Create a builder applying `policy` to template failures.
    pub fn new(policy: ScopeErrorPolicy) -> Self {
        Self { policy }
    }

    /// The active failure policy.
    pub fn policy(&self) -> ScopeErrorPolicy {
        self.policy
    }

    /// Direct strategy: copy each named variable, `null` when it is missing.
    ///
    /// Spec values that are not strings cannot name a variable and resolve
    /// to `null` as well.
    pub fn from_variables(scope_spec: &ConfigMap, variables: &dyn VariableSource) -> ConfigMap {
        scope_spec
            .iter()
            .map(|(field, name)| {
                let value = name
                    .as_str()
                    .and_then(|name| variables.get(name))
                    .unwrap_or(Value::Null);
                (field.clone(), value)
            })
            .collect()
    }

    /// Templated strategy: evaluate each spec value against a snapshot of
    /// the variables.
    ///
    /// # Errors
    ///
    /// With [`ScopeErrorPolicy::Strict`], an undefined variable aborts the
    /// whole build with [`KheopsError::ScopeTemplateError`]. Every other
    /// failure, and every failure under [`ScopeErrorPolicy::Lenient`], is
    /// logged and the field keeps its unevaluated expression.
    pub fn from_template(
        &self,
        scope_spec: &ConfigMap,
        variables: &dyn VariableSource,
        engine: &dyn TemplateEngine,
    ) -> Result<ConfigMap> {
        let context = variables.snapshot();
        let mut scope = ConfigMap::new();

        for (field, expression) in scope_spec {
            let value = match engine.render_value(expression, &context, RenderOptions::SCOPE) {
                Ok(rendered) => {
                    tracing::trace!(%field, %expression, %rendered, "scope expression transformed");
                    rendered
                }
                Err(err) if err.is_undefined() && self.policy == ScopeErrorPolicy::Strict => {
                    return Err(KheopsError::ScopeTemplateError {
                        field: field.clone(),
                        source: err,
                    });
                }
                Err(err) => {
                    tracing::warn!(%field, %expression, error = %err, "scope templating failed, keeping expression");
                    expression.clone()
                }
            };
            scope.insert(field.clone(), value);
        }

        Ok(scope)
    }
}
