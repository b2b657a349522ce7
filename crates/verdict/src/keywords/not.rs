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

// The negated branch is merged only when it passes, which fails `not`, so it never
// contributes evaluated locations.

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    verdict(ctx, std::slice::from_ref(schema), Rule::Not, |_, schema, ctx| {
        schema::check(stack, ctx, schema, instance)
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
    let location = location.join("not");
    let reduction = reduce(ctx, std::slice::from_ref(schema), Rule::Not, |_, schema, ctx| {
        schema::error(stack, ctx, &location, path, schema, instance)
    });
    if reduction.valid {
        return true;
    }
    ctx.add_error(ValidationError::new(
        ValidationErrorKind::Not {
            schema: schema.clone(),
        },
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
    match schema::build(session, schema) {
        Expr::False => Expr::True,
        Expr::True => Expr::False,
        expr => Expr::Not(Box::new(expr)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"not": {"type": "integer"}}), &json!("a"), true)]
    #[test_case(&json!({"not": {"type": "integer"}}), &json!(1), false)]
    #[test_case(&json!({"not": {}}), &json!(1), false)]
    #[test_case(&json!({"not": false}), &json!(1), true)]
    #[test_case(&json!({"not": {"not": {"const": 1}}}), &json!(1), true)]
    fn not(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn message() {
        tests_util::assert_message(
            &json!({"not": {"type": "integer"}}),
            &json!(1),
            "{\"type\":\"integer\"} is not allowed for 1",
        );
    }

    #[test]
    fn negated_properties_stay_unevaluated() {
        let schema = json!({
            "not": {"not": {"properties": {"a": true}}},
            "unevaluatedProperties": false
        });
        tests_util::assert_agree(&schema, &json!({"a": 1}), false);
    }

    #[test_case(&json!({"a": 1}), false)]
    #[test_case(&json!({}), true)]
    fn failing_negated_branch_is_not_merged(instance: &Value, expected: bool) {
        let schema = json!({
            "not": {"properties": {"a": false}},
            "unevaluatedProperties": false
        });
        tests_util::assert_agree(&schema, instance, expected);
    }
}
