use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    keywords::{helpers::as_limit, min_length::length},
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
        (Some(limit), Value::String(item)) => length(item) <= limit,
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
        (Some(limit), Value::String(item)) if length(item) > limit => {
            ctx.add_error(ValidationError::new(
                ValidationErrorKind::MaxLength { limit },
                location.join("maxLength"),
                path.into(),
                instance,
            ))
        }
        _ => true,
    }
}

pub(crate) fn build<'s>(_: &mut BuildSession<'s>, _: &'s Map<String, Value>, schema: &'s Value) -> Expr {
    as_limit(schema).map_or(Expr::True, Expr::MaxLength)
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maxLength": 2}), &json!("ab"), true)]
    #[test_case(&json!({"maxLength": 2}), &json!("abc"), false)]
    #[test_case(&json!({"maxLength": 2}), &json!("éé"), true; "counts scalar values")]
    #[test_case(&json!({"maxLength": 0}), &json!(""), true)]
    fn max_length(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn message() {
        tests_util::assert_message(
            &json!({"maxLength": 1}),
            &json!("ab"),
            "\"ab\" is longer than 1 character",
        );
    }
}
