//! Validator for `unevaluatedProperties` keyword.
//!
//! Runs after every keyword of the same schema node and only sees properties that no earlier
//! keyword (or merged composition branch) recorded as evaluated.
use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{Context, ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    keywords::helpers::{check_child, error_child},
    paths::{LazyLocation, Location},
    schema,
    stack::Stack,
};

pub(crate) fn evaluate<'i, C: Context<'i>>(
    ctx: &mut C,
    object: &'i Map<String, Value>,
    mut matches: impl FnMut(&'i Value) -> bool,
) -> bool {
    let mut evaluated = Vec::new();
    for (key, value) in object {
        if ctx.is_evaluated_key(key) {
            continue;
        }
        if !matches(value) {
            return false;
        }
        evaluated.push(key.as_str());
    }
    for key in evaluated {
        ctx.add_key(key);
    }
    true
}

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::Object(object) = instance else {
        return true;
    };
    let tracking = ctx.tracking();
    evaluate(ctx, object, |value| check_child(stack, tracking, schema, value))
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
    let Value::Object(object) = instance else {
        return true;
    };
    let location = location.join("unevaluatedProperties");
    let unevaluated: Vec<(&'i String, &'i Value)> = object
        .iter()
        .filter(|(key, _)| !ctx.is_evaluated_key(key))
        .collect();
    if schema == &Value::Bool(false) {
        if unevaluated.is_empty() {
            return true;
        }
        return ctx.add_error(ValidationError::new(
            ValidationErrorKind::UnevaluatedProperties {
                unexpected: unevaluated.iter().map(|(key, _)| (*key).clone()).collect(),
            },
            location,
            path.into(),
            instance,
        ));
    }
    let mut valid = true;
    for &(key, value) in &unevaluated {
        valid &= error_child(
            stack,
            ctx,
            &location,
            &path.push(key.as_str()),
            schema,
            value,
        );
    }
    if valid {
        for (key, _) in unevaluated {
            ctx.add_key(key);
        }
    }
    valid
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    Expr::UnevaluatedProperties(Box::new(schema::build(session, schema)))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"unevaluatedProperties": false}), &json!({}), true)]
    #[test_case(&json!({"unevaluatedProperties": false}), &json!({"a": 1}), false)]
    #[test_case(&json!({"properties": {"a": true}, "unevaluatedProperties": false}), &json!({"a": 1}), true)]
    #[test_case(&json!({"patternProperties": {"^a": true}, "unevaluatedProperties": false}), &json!({"ab": 1, "b": 1}), false)]
    #[test_case(&json!({"additionalProperties": true, "unevaluatedProperties": false}), &json!({"x": 1}), true)]
    #[test_case(&json!({"unevaluatedProperties": {"type": "string"}}), &json!({"a": "x"}), true)]
    #[test_case(&json!({"unevaluatedProperties": {"type": "string"}}), &json!({"a": 1}), false)]
    #[test_case(&json!({"allOf": [{"properties": {"a": {"type": "string"}}}], "unevaluatedProperties": false}), &json!({"a": 1}), false; "failed branch")]
    #[test_case(&json!({"$defs": {"a": {"properties": {"a": true}}}, "$ref": "#/$defs/a", "unevaluatedProperties": false}), &json!({"a": 1}), true; "through references")]
    #[test_case(&json!({"properties": {"n": {"properties": {"a": true}}}, "unevaluatedProperties": false}), &json!({"n": {"b": 1}}), true; "nested objects are separate")]
    #[test_case(&json!({"unevaluatedProperties": false}), &json!([1]), true)]
    fn unevaluated_properties(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn nested_unevaluated_properties() {
        let schema = json!({
            "allOf": [{"unevaluatedProperties": true}],
            "unevaluatedProperties": false
        });
        tests_util::assert_agree(&schema, &json!({"a": 1}), true);
    }

    #[test]
    fn message() {
        tests_util::assert_message(
            &json!({"properties": {"a": true}, "unevaluatedProperties": false}),
            &json!({"a": 1, "b": 2}),
            "Unevaluated properties are not allowed ('b' was unexpected)",
        );
    }
}
