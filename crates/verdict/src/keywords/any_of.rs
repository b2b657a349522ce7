use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    paths::{LazyLocation, Location},
    reducer::{reduce, verdict, Rule},
    schema,
    stack::Stack,
};

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::Array(branches) = schema else {
        return true;
    };
    verdict(ctx, branches, Rule::Any, |_, branch, ctx| {
        schema::check(stack, ctx, branch, instance)
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
    let Value::Array(branches) = schema else {
        return true;
    };
    let location = location.join("anyOf");
    let reduction = reduce(ctx, branches, Rule::Any, |idx, branch, ctx| {
        schema::error(stack, ctx, &location.join(idx), path, branch, instance)
    });
    if reduction.valid {
        return true;
    }
    for failure in reduction.failures {
        ctx.append_errors(failure);
    }
    ctx.add_error(ValidationError::new(
        ValidationErrorKind::AnyOf,
        location,
        path.into(),
        instance,
    ))
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    let Value::Array(branches) = schema else {
        return Expr::True;
    };
    Expr::AnyOf(
        branches
            .iter()
            .map(|branch| schema::build(session, branch))
            .collect(),
    )
}
