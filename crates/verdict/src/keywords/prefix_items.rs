use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{Context, ErrorContext, EvaluationContext},
    keywords::helpers::{check_child, error_child},
    paths::{LazyLocation, Location},
    schema,
    stack::Stack,
};

/// Validate the leading elements position by position.
///
/// Elements beyond the tuple, and tuple positions beyond the array, are not examined here.
pub(crate) fn evaluate<'a, 'i, C: Context<'i>, S>(
    ctx: &mut C,
    items: &'i [Value],
    schemas: &'a [S],
    mut matches: impl FnMut(&'a S, &'i Value) -> bool,
) -> bool {
    let valid = items
        .iter()
        .zip(schemas)
        .all(|(item, schema)| matches(schema, item));
    if valid {
        for idx in 0..items.len().min(schemas.len()) {
            ctx.add_index(idx);
        }
    }
    valid
}

/// Shared by the draft 2020-12 `prefixItems` and the array form of `items`.
pub(crate) fn check_tuple<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    schemas: &'s [Value],
    items: &'i [Value],
) -> bool {
    let tracking = ctx.tracking();
    evaluate(ctx, items, schemas, |schema, item| {
        check_child(stack, tracking, schema, item)
    })
}

pub(crate) fn error_tuple<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    schemas: &'s [Value],
    items: &'i [Value],
) -> bool {
    let mut valid = true;
    for (idx, (item, schema)) in items.iter().zip(schemas).enumerate() {
        valid &= error_child(
            stack,
            ctx,
            &location.join(idx),
            &path.push(idx),
            schema,
            item,
        );
    }
    if valid {
        for idx in 0..items.len().min(schemas.len()) {
            ctx.add_index(idx);
        }
    }
    valid
}

pub(crate) fn build_tuple<'s>(session: &mut BuildSession<'s>, schemas: &'s [Value]) -> Expr {
    let exprs: Vec<Expr> = schemas
        .iter()
        .map(|schema| schema::build(session, schema))
        .collect();
    if !session.tracking() && exprs.iter().all(|expr| matches!(expr, Expr::True)) {
        return Expr::True;
    }
    Expr::PrefixItems(exprs)
}

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match (schema, instance) {
        (Value::Array(schemas), Value::Array(items)) => check_tuple(stack, ctx, schemas, items),
        _ => true,
    }
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
    match (schema, instance) {
        (Value::Array(schemas), Value::Array(items)) => error_tuple(
            stack,
            ctx,
            &location.join("prefixItems"),
            path,
            schemas,
            items,
        ),
        _ => true,
    }
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    match schema {
        Value::Array(schemas) => build_tuple(session, schemas),
        _ => Expr::True,
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"prefixItems": [{"type": "integer"}, {"type": "string"}]}), &json!([1, "a"]), true)]
    #[test_case(&json!({"prefixItems": [{"type": "integer"}, {"type": "string"}]}), &json!([1, 2]), false)]
    #[test_case(&json!({"prefixItems": [{"type": "integer"}, {"type": "string"}]}), &json!([1]), true; "shorter arrays")]
    #[test_case(&json!({"prefixItems": [{"type": "integer"}]}), &json!([1, "extra"]), true; "longer arrays")]
    #[test_case(&json!({"prefixItems": [false]}), &json!([]), true)]
    fn prefix_items(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(
            &json!({"prefixItems": [{"type": "integer"}, {"type": "string"}]}),
            &json!([1, 2]),
            "/prefixItems/1/type",
        );
    }

    #[test]
    fn instance_location() {
        tests_util::assert_instance_location(
            &json!({"prefixItems": [true, {"type": "string"}]}),
            &json!([1, 2]),
            "/1",
        );
    }
}
