use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    ext::numeric,
    paths::{LazyLocation, Location},
    stack::Stack,
};

// The boolean draft 4 form only modifies `minimum`.

pub(crate) fn check<'s, 'i>(
    _: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match (schema, instance) {
        (Value::Number(limit), Value::Number(item)) => numeric::gt(item, limit),
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
    match (schema, instance) {
        (Value::Number(limit), Value::Number(item)) if !numeric::gt(item, limit) => {
            ctx.add_error(ValidationError::new(
                ValidationErrorKind::ExclusiveMinimum {
                    limit: schema.clone(),
                },
                location.join("exclusiveMinimum"),
                path.into(),
                instance,
            ))
        }
        _ => true,
    }
}

pub(crate) fn build<'s>(_: &mut BuildSession<'s>, _: &'s Map<String, Value>, schema: &'s Value) -> Expr {
    match schema {
        Value::Number(limit) => Expr::ExclusiveMinimum(limit.clone()),
        _ => Expr::True,
    }
}
