use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    ext::numeric,
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
    match (schema, instance) {
        (Value::Number(multiple_of), Value::Number(item)) => {
            numeric::is_multiple_of(item, multiple_of)
        }
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
    match (schema, instance) {
        (Value::Number(multiple_of), Value::Number(item))
            if !numeric::is_multiple_of(item, multiple_of) =>
        {
            ctx.add_error(ValidationError::new(
                ValidationErrorKind::MultipleOf {
                    multiple_of: schema.clone(),
                },
                location.join("multipleOf"),
                path.into(),
                instance,
            ))
        }
        _ => true,
    }
}

pub(crate) fn build<'s>(_: &mut BuildSession<'s>, _: &'s Map<String, Value>, schema: &'s Value) -> Expr {
    match schema {
        Value::Number(multiple_of) => Expr::MultipleOf(multiple_of.clone()),
        _ => Expr::True,
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"multipleOf": 2}), &json!(4), true)]
    #[test_case(&json!({"multipleOf": 2}), &json!(5), false)]
    #[test_case(&json!({"multipleOf": 0.01}), &json!(19.99), true)]
    #[test_case(&json!({"multipleOf": 0.5}), &json!(4.75), false)]
    #[test_case(&json!({"multipleOf": 1.5}), &json!(4.5), true)]
    fn multiple_of(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(&json!({"multipleOf": 2}), &json!(3), "/multipleOf");
    }
}
