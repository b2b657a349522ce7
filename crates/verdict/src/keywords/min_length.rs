use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    keywords::helpers::as_limit,
    paths::{LazyLocation, Location},
    stack::Stack,
};

/// Length in Unicode scalar values.
#[inline]
pub(crate) fn length(item: &str) -> u64 {
    bytecount::num_chars(item.as_bytes()) as u64
}

pub(crate) fn check<'s, 'i>(
    _: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match (as_limit(schema), instance) {
        (Some(limit), Value::String(item)) => length(item) >= limit,
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
        (Some(limit), Value::String(item)) if length(item) < limit => {
            ctx.add_error(ValidationError::new(
                ValidationErrorKind::MinLength { limit },
                location.join("minLength"),
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
        Some(limit) => Expr::MinLength(limit),
    }
}
