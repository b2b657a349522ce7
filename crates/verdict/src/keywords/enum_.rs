use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    ext::cmp::equal,
    paths::{LazyLocation, Location},
    stack::Stack,
};

#[inline]
pub(crate) fn is_member(options: &[Value], instance: &Value) -> bool {
    options.iter().any(|option| equal(option, instance))
}

pub(crate) fn check<'s, 'i>(
    _: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match schema {
        Value::Array(options) => is_member(options, instance),
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
    match schema {
        Value::Array(options) if !is_member(options, instance) => {
            ctx.add_error(ValidationError::new(
                ValidationErrorKind::Enum {
                    options: schema.clone(),
                },
                location.join("enum"),
                path.into(),
                instance,
            ))
        }
        _ => true,
    }
}

pub(crate) fn build<'s>(_: &mut BuildSession<'s>, _: &'s Map<String, Value>, schema: &'s Value) -> Expr {
    match schema {
        Value::Array(options) => Expr::Enum(options.clone()),
        _ => Expr::True,
    }
}
