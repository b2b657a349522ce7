use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    keywords::helpers::as_limit,
    paths::{LazyLocation, Location},
    stack::Stack,
};

pub(crate) fn check<'s, 'i>(
    _: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match (as_limit(schema), instance) {
        (Some(limit), Value::Array(items)) => (items.len() as u64) >= limit,
        _ => true,
    }
}

pub(crate) fn error<'s, 'i>(
    _: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match (as_limit(schema), instance) {
        (Some(limit), Value::Array(items)) if (items.len() as u64) < limit => {
            ctx.add_error(ValidationError::new(
                ValidationErrorKind::MinItems { limit },
                location.join("minItems"),
                path.into(),
                instance,
            ))
        }
        _ => true,
    }
}

pub(crate) fn build<'s>(_: &mut BuildSession<'s>, _: &'s Map<String, Value>, schema: &'s Value) -> Expr {
    match as_limit(schema) {
        Some(0) | None => Expr::True,
        Some(limit) => Expr::MinItems(limit),
    }
}
