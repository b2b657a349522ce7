use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{Context, ErrorContext, EvaluationContext},
    keywords::{
        helpers::{check_child, error_child},
        prefix_items,
    },
    paths::{LazyLocation, Location},
    schema,
    stack::Stack,
};

/// Validate every element from `skip` on; all of them are recorded when they pass.
pub(crate) fn evaluate_tail<'i, C: Context<'i>>(
    ctx: &mut C,
    items: &'i [Value],
    skip: usize,
    mut matches: impl FnMut(&'i Value) -> bool,
) -> bool {
    let valid = items.iter().skip(skip).all(|item| matches(item));
    if valid {
        for idx in skip..items.len() {
            ctx.add_index(idx);
        }
    }
    valid
}

pub(crate) fn check_tail<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    schema: &'s Value,
    items: &'i [Value],
    skip: usize,
) -> bool {
    let tracking = ctx.tracking();
    evaluate_tail(ctx, items, skip, |item| {
        check_child(stack, tracking, schema, item)
    })
}

pub(crate) fn error_tail<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    schema: &'s Value,
    items: &'i [Value],
    skip: usize,
) -> bool {
    let mut valid = true;
    for (idx, item) in items.iter().enumerate().skip(skip) {
        valid &= error_child(stack, ctx, location, &path.push(idx), schema, item);
    }
    if valid {
        for idx in skip..items.len() {
            ctx.add_index(idx);
        }
    }
    valid
}

pub(crate) fn build_tail<'s>(session: &mut BuildSession<'s>, schema: &'s Value, skip: usize) -> Expr {
    let schema = schema::build(session, schema);
    if matches!(schema, Expr::True) && !session.tracking() {
        return Expr::True;
    }
    Expr::Items {
        skip,
        schema: Box::new(schema),
    }
}

/// Elements already covered by `prefixItems`.
fn prefix_length(parent: &Map<String, Value>) -> usize {
    parent
        .get("prefixItems")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::Array(items) = instance else {
        return true;
    };
    match schema {
        Value::Array(schemas) => prefix_items::check_tuple(stack, ctx, schemas, items),
        _ => check_tail(stack, ctx, schema, items, prefix_length(parent)),
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
    let Value::Array(items) = instance else {
        return true;
    };
    let location = location.join("items");
    match schema {
        Value::Array(schemas) => {
            prefix_items::error_tuple(stack, ctx, &location, path, schemas, items)
        }
        _ => error_tail(
            stack,
            ctx,
            &location,
            path,
            schema,
            items,
            prefix_length(parent),
        ),
    }
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    match schema {
        Value::Array(schemas) => prefix_items::build_tuple(session, schemas),
        _ => build_tail(session, schema, prefix_length(parent)),
    }
}
