//! Validator for `additionalProperties` keyword.
//!
//! A property is additional when `properties` does not name it and no valid `patternProperties`
//! pattern matches it.
use std::{collections::BTreeSet, sync::Arc};

use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{Context, ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    keywords::helpers::{check_child, error_child},
    paths::{LazyLocation, Location},
    regex::Pattern,
    schema,
    stack::Stack,
};

/// Validate the additional properties; they are recorded when all of them pass.
pub(crate) fn evaluate<'i, C, P>(
    ctx: &mut C,
    object: &'i Map<String, Value>,
    is_declared: impl Fn(&str) -> bool,
    patterns: &[P],
    mut matches: impl FnMut(&'i Value) -> bool,
) -> bool
where
    C: Context<'i>,
    P: AsRef<Pattern>,
{
    let mut evaluated = Vec::new();
    for (key, value) in object {
        if is_additional(key, &is_declared, patterns) {
            if !matches(value) {
                return false;
            }
            if ctx.tracking() {
                evaluated.push(key.as_str());
            }
        }
    }
    for key in evaluated {
        ctx.add_key(key);
    }
    true
}

#[inline]
fn is_additional<P: AsRef<Pattern>>(
    key: &str,
    is_declared: impl Fn(&str) -> bool,
    patterns: &[P],
) -> bool {
    !is_declared(key) && !patterns.iter().any(|pattern| pattern.as_ref().is_match(key))
}

fn declared(parent: &Map<String, Value>) -> Option<&Map<String, Value>> {
    parent.get("properties").and_then(Value::as_object)
}

fn is_declared_in(properties: Option<&Map<String, Value>>) -> impl Fn(&str) -> bool + '_ {
    move |key| properties.is_some_and(|properties| properties.contains_key(key))
}

fn patterns<'s>(stack: &mut Stack<'s, '_>, parent: &'s Map<String, Value>) -> Vec<Arc<Pattern>> {
    parent
        .get("patternProperties")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(Map::keys)
        .filter_map(|source| stack.pattern(source).ok())
        .collect()
}

/// With `additionalProperties: false`, no `patternProperties` and every declared property
/// required, an object passes exactly when it has as many keys as there are declared properties.
fn exact_property_count(parent: &Map<String, Value>, schema: &Value) -> Option<usize> {
    if schema != &Value::Bool(false) || parent.contains_key("patternProperties") {
        return None;
    }
    let properties = declared(parent)?;
    let required: BTreeSet<&str> = parent
        .get("required")?
        .as_array()?
        .iter()
        .map(Value::as_str)
        .collect::<Option<_>>()?;
    let names: BTreeSet<&str> = properties.keys().map(String::as_str).collect();
    (names == required).then_some(names.len())
}

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::Object(object) = instance else {
        return true;
    };
    if let Some(count) = exact_property_count(parent, schema) {
        return object.len() == count;
    }
    let patterns = patterns(stack, parent);
    let tracking = ctx.tracking();
    evaluate(
        ctx,
        object,
        is_declared_in(declared(parent)),
        &patterns,
        |value| check_child(stack, tracking, schema, value),
    )
}

pub(crate) fn error<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::Object(object) = instance else {
        return true;
    };
    let location = location.join("additionalProperties");
    let patterns = patterns(stack, parent);
    let is_declared = is_declared_in(declared(parent));
    let additional: Vec<(&'i String, &'i Value)> = object
        .iter()
        .filter(|(key, _)| is_additional(key, &is_declared, &patterns))
        .collect();
    if schema == &Value::Bool(false) {
        if additional.is_empty() {
            return true;
        }
        return ctx.add_error(ValidationError::new(
            ValidationErrorKind::AdditionalProperties {
                unexpected: additional.iter().map(|(key, _)| (*key).clone()).collect(),
            },
            location,
            path.into(),
            instance,
        ));
    }
    let mut valid = true;
    for &(key, value) in &additional {
        valid &= error_child(
            stack,
            ctx,
            &location,
            &path.push(key.as_str()),
            schema,
            value,
        );
    }
    if valid {
        for (key, _) in additional {
            ctx.add_key(key);
        }
    }
    valid
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    if let Some(count) = exact_property_count(parent, schema) {
        return Expr::PropertyCount(count);
    }
    let expr = schema::build(session, schema);
    if matches!(expr, Expr::True) && !session.tracking() {
        return Expr::True;
    }
    let properties = declared(parent)
        .map(|properties| properties.keys().cloned().collect())
        .unwrap_or_default();
    let mut patterns = Vec::new();
    if let Some(Value::Object(sources)) = parent.get("patternProperties") {
        for source in sources.keys() {
            if let Ok(pattern) = session.pattern(source) {
                patterns.push(pattern);
            }
        }
    }
    Expr::AdditionalProperties {
        properties,
        patterns,
        schema: Box::new(expr),
    }
}
