use super::{RenderOptions, TemplateEngine, TemplateError};
use crate::sources::ConfigMap;
use serde_json::Value;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A minimal engine resolving `{{ dotted.path }}` expressions.
///
/// Each path segment is an object field or an array index. Text outside the
/// delimiters is copied as-is.
///
/// # Examples
///
/// ```rust
/// use kheops_resolver::template::{PathTemplateEngine, RenderOptions, TemplateEngine};
/// use serde_json::json;
///
/// let context = json!({"ansible_facts": {"fqdn": "web1.example.org"}});
/// let context = context.as_object().unwrap();
/// let value = PathTemplateEngine
///     .render("{{ ansible_facts.fqdn }}", context, RenderOptions::SCOPE)
///     .unwrap();
/// assert_eq!(value, "web1.example.org");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct PathTemplateEngine;

#[derive(Debug, PartialEq)]
enum Segment<'t> {
    Text(&'t str),
    Expr(&'t str),
}

fn split(template: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let stray = || TemplateError::Syntax(format!("unexpected `{}` in `{}`", CLOSE, template));
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        if start > 0 {
            let text = &rest[..start];
            if text.contains(CLOSE) {
                return Err(stray());
            }
            segments.push(Segment::Text(text));
        }
        let after = &rest[start + OPEN.len()..];
        let end = after
            .find(CLOSE)
            .ok_or_else(|| TemplateError::Syntax(format!("unclosed expression in `{}`", template)))?;
        segments.push(Segment::Expr(after[..end].trim()));
        rest = &after[end + CLOSE.len()..];
    }

    if rest.contains(CLOSE) {
        return Err(stray());
    }
    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    Ok(segments)
}

fn resolve<'c>(path: &str, context: &'c ConfigMap) -> Result<&'c Value, TemplateError> {
    let mut parts = path.split('.');
    let root = parts.next().unwrap_or_default();
    for part in path.split('.') {
        let valid = !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(TemplateError::Syntax(format!("invalid expression `{}`", path)));
        }
    }

    let mut current = context
        .get(root)
        .ok_or_else(|| TemplateError::Undefined(root.to_string()))?;
    for part in parts {
        let next = match current {
            Value::Object(map) => map.get(part),
            Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| TemplateError::Undefined(path.to_string()))?;
    }
    Ok(current)
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl TemplateEngine for PathTemplateEngine {
    fn render(
        &self,
        template: &str,
        context: &ConfigMap,
        options: RenderOptions,
    ) -> Result<Value, TemplateError> {
        let segments = split(template)?;

        if options.convert_data {
            if let [Segment::Expr(path)] = segments.as_slice() {
                return resolve(path, context).cloned();
            }
        }

        let mut rendered = String::with_capacity(template.len());
        for segment in &segments {
            match segment {
                Segment::Text(text) => rendered.push_str(text),
                Segment::Expr(path) => rendered.push_str(&as_text(resolve(path, context)?)),
            }
        }

        if !options.preserve_trailing_newlines && rendered.ends_with('\n') {
            rendered.pop();
        }
        Ok(Value::String(rendered))
    }
}
