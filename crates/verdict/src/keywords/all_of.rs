use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
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
    verdict(ctx, branches, Rule::All, |_, branch, ctx| {
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
    let location = location.join("allOf");
    let reduction = reduce(ctx, branches, Rule::All, |idx, branch, ctx| {
        schema::error(stack, ctx, &location.join(idx), path, branch, instance)
    });
    for failure in reduction.failures {
        ctx.append_errors(failure);
    }
    reduction.valid
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    let Value::Array(branches) = schema else {
        return Expr::True;
    };
    let branches: Vec<Expr> = branches
        .iter()
        .map(|branch| schema::build(session, branch))
        .collect();
    if branches.iter().all(|expr| matches!(expr, Expr::True)) {
        return Expr::True;
    }
    Expr::AllOf(branches)
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"allOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(3), true)]
    #[test_case(&json!({"allOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1), false)]
    #[test_case(&json!({"allOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(2.5), false)]
    #[test_case(&json!({"allOf": []}), &json!(null), true)]
    #[test_case(&json!({"allOf": [true, false]}), &json!(null), false)]
    fn all_of(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn branch_locations_are_visible_to_unevaluated_properties() {
        let schema = json!({
            "allOf": [{"properties": {"a": {}}}],
            "unevaluatedProperties": false
        });
        tests_util::assert_agree(&schema, &json!({"a": 1}), true);
        tests_util::assert_agree(&schema, &json!({"a": 1, "b": 2}), false);
    }

    #[test]
    fn failing_branches_are_reported() {
        let instance = json!(1);
        let (_, errors) = crate::errors(
            &crate::Definitions::new(),
            &json!({"allOf": [{"type": "string"}, {"minimum": 5}, true]}),
            &instance,
        );
        let paths: Vec<_> = errors
            .iter()
            .map(|error| error.schema_path().to_string())
            .collect();
        assert_eq!(paths, vec!["/allOf/0/type", "/allOf/1/minimum"]);
    }
}
