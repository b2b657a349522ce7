//! `additionalItems` only applies next to the array form of `items`.
use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    keywords::items,
    paths::{LazyLocation, Location},
    stack::Stack,
};

fn tuple_length(parent: &Map<String, Value>) -> Option<usize> {
    parent.get("items").and_then(Value::as_array).map(Vec::len)
}

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match (tuple_length(parent), instance) {
        (Some(skip), Value::Array(elements)) => {
            items::check_tail(stack, ctx, schema, elements, skip)
        }
        _ => true,
    }
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
    let (Some(skip), Value::Array(elements)) = (tuple_length(parent), instance) else {
        return true;
    };
    let location = location.join("additionalItems");
    if schema == &Value::Bool(false) {
        if elements.len() > skip {
            return ctx.add_error(ValidationError::new(
                ValidationErrorKind::AdditionalItems { limit: skip },
                location,
                path.into(),
                instance,
            ));
        }
        return true;
    }
    items::error_tail(stack, ctx, &location, path, schema, elements, skip)
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    match tuple_length(parent) {
        Some(skip) => items::build_tail(session, schema, skip),
        None => Expr::True,
    }
}
