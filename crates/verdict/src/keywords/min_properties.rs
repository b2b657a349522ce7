use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    keywords::helpers::as_limit,
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
    match (as_limit(schema), instance) {
        (Some(limit), Value::Object(object)) => (object.len() as u64) >= limit,
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
    match (as_limit(schema), instance) {
        (Some(limit), Value::Object(object)) if (object.len() as u64) < limit => {
            ctx.add_error(ValidationError::new(
                ValidationErrorKind::MinProperties { limit },
                location.join("minProperties"),
                path.into(),
                instance,
            ))
        }
        _ => true,
    }
}

pub(crate) fn build<'s>(_: &mut BuildSession<'s>, _: &'s Map<String, Value>, schema: &'s Value) -> Expr {
    match as_limit(schema) {
        Some(0) | None => Expr::True,
        Some(limit) => Expr::MinProperties(limit),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minProperties": 1}), &json!({"a": 1}), true)]
    #[test_case(&json!({"minProperties": 1}), &json!({}), false)]
    #[test_case(&json!({"minProperties": 1}), &json!([]), true)]
    fn min_properties(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn message() {
        tests_util::assert_message(
            &json!({"minProperties": 2}),
            &json!({"a": 1}),
            "{\"a\":1} has less than 2 properties",
        );
    }
}
