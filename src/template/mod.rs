//! Template engine collaborator.
//!
//! The orchestrator never depends on a concrete engine: hosts inject their
//! own through [`TemplateEngine`]. [`PathTemplateEngine`] covers the common
//! case of `{{ dotted.path }}` lookups into the variable snapshot.

mod path_engine;

pub use path_engine::PathTemplateEngine;

use crate::sources::ConfigMap;
use serde_json::Value;

/// Errors raised while evaluating a template.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    /// A referenced variable or field does not exist.
    #[error("'{0}' is undefined")]
    Undefined(String),

    /// The template text is malformed.
    #[error("template syntax error: {0}")]
    Syntax(String),

    /// Any other engine failure.
    #[error("template error: {0}")]
    Render(String),
}

impl TemplateError {
    /// Whether this is an undefined-variable failure.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined(_))
    }
}

/// Flags controlling one render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Keep a trailing newline of the rendered text.
    pub preserve_trailing_newlines: bool,
    /// Return native values for single-expression templates instead of text.
    pub convert_data: bool,
}

impl RenderOptions {
    /// Options used when evaluating scope expressions.
    pub const SCOPE: Self = Self {
        preserve_trailing_newlines: true,
        convert_data: true,
    };

    /// Options used when rendering lookup results.
    pub const RESULTS: Self = Self {
        preserve_trailing_newlines: true,
        convert_data: false,
    };
}

/// Evaluates template text against a variable context.
pub trait TemplateEngine {
    /// Render one template string.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] when the template cannot be evaluated.
    fn render(
        &self,
        template: &str,
        context: &ConfigMap,
        options: RenderOptions,
    ) -> Result<Value, TemplateError>;

    /// Render every string inside `value`, keeping its structure.
    ///
    /// Mapping keys are left untouched.
    fn render_value(
        &self,
        value: &Value,
        context: &ConfigMap,
        options: RenderOptions,
    ) -> Result<Value, TemplateError> {
        match value {
            Value::String(text) => self.render(text, context, options),
            Value::Array(items) => items
                .iter()
                .map(|item| self.render_value(item, context, options))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), self.render_value(v, context, options)?)))
                .collect::<Result<ConfigMap, _>>()
                .map(Value::Object),
            scalar => Ok(scalar.clone()),
        }
    }
}
