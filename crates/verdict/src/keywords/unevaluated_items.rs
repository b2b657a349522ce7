//! Validator for `unevaluatedItems` keyword.
use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{Context, ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    keywords::helpers::{check_child, error_child},
    paths::{LazyLocation, Location},
    schema,
    stack::Stack,
};

pub(crate) fn evaluate<'i, C: Context<'i>>(
    ctx: &mut C,
    items: &'i [Value],
    mut matches: impl FnMut(&'i Value) -> bool,
) -> bool {
    let mut evaluated = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        if ctx.is_evaluated_index(idx) {
            continue;
        }
        if !matches(item) {
            return false;
        }
        evaluated.push(idx);
    }
    for idx in evaluated {
        ctx.add_index(idx);
    }
    true
}

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::Array(items) = instance else {
        return true;
    };
    let tracking = ctx.tracking();
    evaluate(ctx, items, |item| check_child(stack, tracking, schema, item))
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
    let Value::Array(items) = instance else {
        return true;
    };
    let location = location.join("unevaluatedItems");
    let unevaluated: Vec<usize> = (0..items.len())
        .filter(|idx| !ctx.is_evaluated_index(*idx))
        .collect();
    if schema == &Value::Bool(false) {
        if unevaluated.is_empty() {
            return true;
        }
        return ctx.add_error(ValidationError::new(
            ValidationErrorKind::UnevaluatedItems {
                unexpected: unevaluated,
            },
            location,
            path.into(),
            instance,
        ));
    }
    let mut valid = true;
    for &idx in &unevaluated {
        valid &= error_child(stack, ctx, &location, &path.push(idx), schema, &items[idx]);
    }
    if valid {
        for idx in unevaluated {
            ctx.add_index(idx);
        }
    }
    valid
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    Expr::UnevaluatedItems(Box::new(schema::build(session, schema)))
}
