use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    paths::{LazyLocation, Location},
    stack::Stack,
    types::{JsonType, JsonTypeSet},
};

/// Declared types; unknown names are skipped and a malformed value disables the keyword.
pub(crate) fn parse(value: &Value) -> Option<JsonTypeSet> {
    match value {
        Value::String(name) => Some(
            JsonType::try_from(name.as_str()).map_or(JsonTypeSet::empty(), JsonTypeSet::from),
        ),
        Value::Array(names) => Some(
            names
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|name| JsonType::try_from(name).ok())
                .fold(JsonTypeSet::empty(), JsonTypeSet::insert),
        ),
        _ => None,
    }
}

pub(crate) fn check<'s, 'i>(
    _: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    parse(schema).is_none_or(|types| types.matches(instance))
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
    match parse(schema) {
        Some(types) if !types.matches(instance) => ctx.add_error(ValidationError::new(
            ValidationErrorKind::Type { expected: types },
            location.join("type"),
            path.into(),
            instance,
        )),
        _ => true,
    }
}

pub(crate) fn build<'s>(_: &mut BuildSession<'s>, _: &'s Map<String, Value>, schema: &'s Value) -> Expr {
    parse(schema).map_or(Expr::True, Expr::Type)
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"type": "integer"}), &json!(1), true)]
    #[test_case(&json!({"type": "integer"}), &json!(1.0), true)]
    #[test_case(&json!({"type": "integer"}), &json!(1.5), false)]
    #[test_case(&json!({"type": ["string", "null"]}), &json!(null), true)]
    #[test_case(&json!({"type": ["string", "null"]}), &json!(0), false)]
    #[test_case(&json!({"type": "object"}), &json!([]), false)]
    #[test_case(&json!({"type": "unknown"}), &json!(0), false)]
    #[test_case(&json!({"type": 5}), &json!(0), true; "malformed type is ignored")]
    fn type_keyword(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(&json!({"type": "string"}), &json!(1), "/type");
    }

    #[test]
    fn message() {
        tests_util::assert_message(
            &json!({"type": "array"}),
            &json!("foo"),
            "\"foo\" is not of type \"array\"",
        );
    }
}
