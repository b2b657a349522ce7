use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    paths::{LazyLocation, Location},
    stack::Stack,
};

// A pattern neither regex engine accepts matches nothing.

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match (schema, instance) {
        (Value::String(source), Value::String(item)) => stack
            .pattern(source)
            .is_ok_and(|pattern| pattern.is_match(item)),
        _ => true,
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
    if check(stack, &mut EvaluationContext::default(), parent, schema, instance) {
        return true;
    }
    let Value::String(source) = schema else {
        return true;
    };
    ctx.add_error(ValidationError::new(
        ValidationErrorKind::Pattern {
            pattern: source.clone(),
        },
        location.join("pattern"),
        path.into(),
        instance,
    ))
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    let Value::String(source) = schema else {
        return Expr::True;
    };
    match session.pattern(source) {
        Ok(pattern) => Expr::Pattern(pattern),
        Err(error) => Expr::Unsatisfiable(format!(
            "invalid pattern {:?}: {}",
            error.pattern, error.message
        )),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"pattern": "^a*$"}), &json!("aaa"), true)]
    #[test_case(&json!({"pattern": "^a*$"}), &json!("abc"), false)]
    #[test_case(&json!({"pattern": "b"}), &json!("abc"), true; "unanchored search")]
    #[test_case(&json!({"pattern": "^(?!eo:)"}), &json!("eo:bands"), false; "look-around")]
    #[test_case(&json!({"pattern": "^x-"}), &json!("x-rate"), true; "literal prefix")]
    #[test_case(&json!({"pattern": "(unclosed"}), &json!("anything"), false; "invalid pattern matches nothing")]
    #[test_case(&json!({"pattern": "(unclosed"}), &json!(1), true; "non-strings are ignored")]
    fn pattern(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(&json!({"pattern": "^a"}), &json!("b"), "/pattern");
    }
}
