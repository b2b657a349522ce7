use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{Context, ErrorContext, EvaluationContext},
    keywords::helpers::{check_child, error_child},
    paths::{LazyLocation, Location},
    regex::Pattern,
    schema,
    stack::Stack,
};

/// Validate every property against each schema whose pattern matches its name.
///
/// Matched properties are recorded when they all pass.
pub(crate) fn evaluate<'a, 'i, C, P, S>(
    ctx: &mut C,
    object: &'i Map<String, Value>,
    patterns: &'a [(P, S)],
    mut matches: impl FnMut(&'a S, &'i Value) -> bool,
) -> bool
where
    C: Context<'i>,
    P: AsRef<Pattern>,
{
    let mut evaluated = Vec::new();
    for (key, value) in object {
        let mut matched = false;
        for (pattern, schema) in patterns {
            if pattern.as_ref().is_match(key) {
                if !matches(schema, value) {
                    return false;
                }
                matched = true;
            }
        }
        if matched && ctx.tracking() {
            evaluated.push(key.as_str());
        }
    }
    for key in evaluated {
        ctx.add_key(key);
    }
    true
}

/// Compiled patterns of a `patternProperties` object; invalid ones are dropped.
pub(crate) fn compile<'s>(
    stack: &mut Stack<'s, '_>,
    patterns: &'s Map<String, Value>,
) -> Vec<(Arc<Pattern>, &'s Value)> {
    patterns
        .iter()
        .filter_map(|(source, schema)| {
            stack
                .pattern(source)
                .ok()
                .map(|pattern| (pattern, schema))
        })
        .collect()
}

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let (Value::Object(patterns), Value::Object(object)) = (schema, instance) else {
        return true;
    };
    let patterns = compile(stack, patterns);
    let tracking = ctx.tracking();
    evaluate(ctx, object, &patterns, |schema, value| {
        check_child(stack, tracking, *schema, value)
    })
}

pub(crate) fn error<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let (Value::Object(patterns), Value::Object(object)) = (schema, instance) else {
        return true;
    };
    let location = location.join("patternProperties");
    let patterns = compile(stack, patterns);
    let mut valid = true;
    let mut evaluated = Vec::new();
    for (key, value) in object {
        let mut matched = false;
        for (pattern, schema) in &patterns {
            if pattern.is_match(key) {
                valid &= error_child(
                    stack,
                    ctx,
                    &location.join(pattern.as_str()),
                    &path.push(key.as_str()),
                    *schema,
                    value,
                );
                matched = true;
            }
        }
        if matched {
            evaluated.push(key.as_str());
        }
    }
    if valid {
        for key in evaluated {
            ctx.add_key(key);
        }
    }
    valid
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    let Value::Object(patterns) = schema else {
        return Expr::True;
    };
    let mut compiled = Vec::with_capacity(patterns.len());
    for (source, schema) in patterns {
        if let Ok(pattern) = session.pattern(source) {
            compiled.push((pattern, schema::build(session, schema)));
        }
    }
    if !session.tracking() && compiled.iter().all(|(_, expr)| matches!(expr, Expr::True)) {
        return Expr::True;
    }
    Expr::PatternProperties(compiled)
}
