use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    ext::cmp::equal,
    paths::{LazyLocation, Location},
    stack::Stack,
};

pub(crate) fn check<'s, 'i>(
    _: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    equal(schema, instance)
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
    if equal(schema, instance) {
        true
    } else {
        ctx.add_error(ValidationError::new(
            ValidationErrorKind::Const {
                expected: schema.clone(),
            },
            location.join("const"),
            path.into(),
            instance,
        ))
    }
}

pub(crate) fn build<'s>(_: &mut BuildSession<'s>, _: &'s Map<String, Value>, schema: &'s Value) -> Expr {
    Expr::Const(schema.clone())
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"const": 1}), &json!(1.0), true)]
    #[test_case(&json!({"const": {"a": [1, null]}}), &json!({"a": [1, null]}), true)]
    #[test_case(&json!({"const": {"a": 1}}), &json!({"a": 1, "b": 1}), false)]
    #[test_case(&json!({"const": null}), &json!(false), false)]
    #[test_case(&json!({"const": "a"}), &json!("a"), true)]
    fn const_keyword(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(&json!({"const": 2}), &json!(3), "/const");
    }
}
