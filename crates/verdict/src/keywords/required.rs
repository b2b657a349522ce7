use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    paths::{LazyLocation, Location},
    stack::Stack,
};

pub(crate) fn names(schema: &Value) -> impl Iterator<Item = &str> {
    schema
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

pub(crate) fn check<'s, 'i>(
    _: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match instance {
        Value::Object(object) => names(schema).all(|name| object.contains_key(name)),
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
    let Value::Object(object) = instance else {
        return true;
    };
    let mut valid = true;
    for name in names(schema) {
        if !object.contains_key(name) {
            valid = ctx.add_error(ValidationError::new(
                ValidationErrorKind::Required {
                    property: name.to_string(),
                },
                location.join("required"),
                path.into(),
                instance,
            ));
        }
    }
    valid
}

pub(crate) fn build<'s>(_: &mut BuildSession<'s>, _: &'s Map<String, Value>, schema: &'s Value) -> Expr {
    let names: Vec<String> = names(schema).map(str::to_string).collect();
    if names.is_empty() {
        Expr::True
    } else {
        Expr::Required(names)
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"required": ["a", "b"]}), &json!({"a": 1, "b": null}), true)]
    #[test_case(&json!({"required": ["a", "b"]}), &json!({"a": 1}), false)]
    #[test_case(&json!({"required": ["a"]}), &json!(["a"]), true)]
    #[test_case(&json!({"required": []}), &json!({}), true)]
    fn required(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn every_missing_property_is_reported() {
        let instance = json!({"b": 1});
        let (_, errors) = crate::errors(
            &crate::Definitions::new(),
            &json!({"required": ["a", "b", "c"]}),
            &instance,
        );
        let messages: Vec<_> = errors.iter().map(|error| error.message()).collect();
        assert_eq!(
            messages,
            vec!["\"a\" is a required property", "\"c\" is a required property"]
        );
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(&json!({"required": ["a"]}), &json!({}), "/required");
    }
}
