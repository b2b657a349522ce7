use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{Context, ErrorContext, EvaluationContext},
    keywords::{
        helpers::{check_child, error_child},
        required,
    },
    paths::{LazyLocation, Location},
    schema,
    stack::Stack,
};

/// Validate each present property against its schema. Absent properties pass.
///
/// The present properties are recorded as evaluated when all of them pass.
pub(crate) fn evaluate<'a, 'i, C, S: 'a>(
    ctx: &mut C,
    object: &'i Map<String, Value>,
    schemas: impl IntoIterator<Item = (&'a str, &'a S)>,
    mut matches: impl FnMut(&'a S, &'i Value) -> bool,
) -> bool
where
    C: Context<'i>,
{
    let mut evaluated = Vec::new();
    for (name, schema) in schemas {
        if let Some((key, value)) = object.get_key_value(name) {
            if !matches(schema, value) {
                return false;
            }
            if ctx.tracking() {
                evaluated.push(key.as_str());
            }
        }
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
    let (Value::Object(properties), Value::Object(object)) = (schema, instance) else {
        return true;
    };
    let tracking = ctx.tracking();
    evaluate(
        ctx,
        object,
        properties.iter().map(|(name, schema)| (name.as_str(), schema)),
        |schema, value| check_child(stack, tracking, schema, value),
    )
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
    let (Value::Object(properties), Value::Object(object)) = (schema, instance) else {
        return true;
    };
    let location = location.join("properties");
    let mut valid = true;
    let mut evaluated = Vec::new();
    for (name, schema) in properties {
        if let Some((key, value)) = object.get_key_value(name) {
            valid &= error_child(
                stack,
                ctx,
                &location.join(name),
                &path.push(key.as_str()),
                schema,
                value,
            );
            evaluated.push(key.as_str());
        }
    }
    if valid {
        for key in evaluated {
            ctx.add_key(key);
        }
    }
    valid
}

/// `required` runs before `properties`, so names it lists skip the presence test.
pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    let Value::Object(properties) = schema else {
        return Expr::True;
    };
    let schemas: Vec<(String, Expr)> = properties
        .iter()
        .map(|(name, schema)| (name.clone(), schema::build(session, schema)))
        .collect();
    if !session.tracking() && schemas.iter().all(|(_, expr)| matches!(expr, Expr::True)) {
        return Expr::True;
    }
    let required = parent
        .get("required")
        .map(|names| {
            required::names(names)
                .filter(|name| properties.contains_key(*name))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Expr::Properties { schemas, required }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!({"a": "x"}), true)]
    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!({"a": 1}), false)]
    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!({"b": 1}), true; "absent properties pass")]
    #[test_case(&json!({"properties": {"a": false}}), &json!({}), true)]
    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!(["a"]), true)]
    fn properties(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test_case(&json!({"a": "x", "b": 1}), true)]
    #[test_case(&json!({"a": 1, "b": 1}), false)]
    #[test_case(&json!({"b": 1}), false; "required property is missing")]
    #[test_case(&json!({"a": "x", "b": "y"}), false)]
    fn required_properties(instance: &Value, expected: bool) {
        let schema = json!({
            "required": ["a"],
            "properties": {"a": {"type": "string"}, "b": {"type": "integer"}}
        });
        tests_util::assert_agree(&schema, instance, expected);
    }

    #[test]
    fn required_properties_skip_presence_test() {
        let schema = json!({
            "type": "object",
            "required": ["a"],
            "properties": {"a": {"type": "string"}, "b": {"type": "integer"}}
        });
        let source = crate::compile(&crate::Definitions::new(), &schema).source();
        assert!(!source.contains("!(\"a\" in value)"), "{source}");
        assert!(source.contains("!(\"b\" in value)"), "{source}");
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(
            &json!({"properties": {"a/b": {"type": "string"}}}),
            &json!({"a/b": 1}),
            "/properties/a~1b/type",
        );
    }

    #[test]
    fn instance_location() {
        tests_util::assert_instance_location(
            &json!({"properties": {"a": {"properties": {"b": {"type": "string"}}}}}),
            &json!({"a": {"b": 1}}),
            "/a/b",
        );
    }
}
