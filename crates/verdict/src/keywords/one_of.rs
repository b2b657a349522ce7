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
    verdict(ctx, branches, Rule::One, |_, branch, ctx| {
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
    let location = location.join("oneOf");
    let reduction = reduce(ctx, branches, Rule::One, |idx, branch, ctx| {
        schema::error(stack, ctx, &location.join(idx), path, branch, instance)
    });
    if reduction.valid {
        return true;
    }
    if reduction.passing.is_empty() {
        for failure in reduction.failures {
            ctx.append_errors(failure);
        }
    }
    ctx.add_error(ValidationError::new(
        ValidationErrorKind::OneOf {
            passing: reduction.passing,
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
    let Value::Array(branches) = schema else {
        return Expr::True;
    };
    Expr::OneOf(
        branches
            .iter()
            .map(|branch| schema::build(session, branch))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1), true)]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(2.5), true)]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(3), false; "both match")]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1.5), false; "none match")]
    #[test_case(&json!({"oneOf": [true, true, false]}), &json!(null), false)]
    fn one_of(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn passing_branches_are_listed() {
        let instance = json!(3);
        let (_, errors) = crate::errors(
            &crate::Definitions::new(),
            &json!({"oneOf": [{"type": "integer"}, {"minimum": 2}, {"maximum": 0}]}),
            &instance,
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_record().params, json!({"passingSchemas": [0, 1]}));
    }

    #[test]
    fn only_the_passing_branch_is_merged() {
        let schema = json!({
            "oneOf": [
                {"properties": {"a": true}, "required": ["a"]},
                {"properties": {"b": true}, "required": ["b"]}
            ],
            "unevaluatedProperties": false
        });
        tests_util::assert_agree(&schema, &json!({"a": 1}), true);
        tests_util::assert_agree(&schema, &json!({"a": 1, "c": 1}), false);
    }
}
