//! `maximum`, including the draft 4 form where a boolean `exclusiveMaximum` makes it strict.
use serde_json::{Map, Number, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    ext::numeric,
    paths::{LazyLocation, Location},
    stack::Stack,
};

#[inline]
fn is_exclusive(parent: &Map<String, Value>) -> bool {
    matches!(parent.get("exclusiveMaximum"), Some(Value::Bool(true)))
}

#[inline]
pub(crate) fn is_valid(instance: &Number, limit: &Number, exclusive: bool) -> bool {
    if exclusive {
        numeric::lt(instance, limit)
    } else {
        numeric::le(instance, limit)
    }
}

pub(crate) fn check<'s, 'i>(
    _: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match (schema, instance) {
        (Value::Number(limit), Value::Number(item)) => is_valid(item, limit, is_exclusive(parent)),
        _ => true,
    }
}

pub(crate) fn error<'s, 'i>(
    _: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let (Value::Number(limit), Value::Number(item)) = (schema, instance) else {
        return true;
    };
    let exclusive = is_exclusive(parent);
    if is_valid(item, limit, exclusive) {
        return true;
    }
    let limit = schema.clone();
    let kind = if exclusive {
        ValidationErrorKind::ExclusiveMaximum { limit }
    } else {
        ValidationErrorKind::Maximum { limit }
    };
    ctx.add_error(ValidationError::new(
        kind,
        location.join("maximum"),
        path.into(),
        instance,
    ))
}

pub(crate) fn build<'s>(
    _: &mut BuildSession<'s>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    match schema {
        Value::Number(limit) if is_exclusive(parent) => Expr::ExclusiveMaximum(limit.clone()),
        Value::Number(limit) => Expr::Maximum(limit.clone()),
        _ => Expr::True,
    }
}
