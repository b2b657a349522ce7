//! The recursive dispatcher shared by all strategies.
//!
//! A schema node is either a boolean schema or a keyword object whose meaning is the conjunction
//! of its keywords. Keywords are visited in [`GROUPS`] order; a group guarded by a family is
//! skipped for values of another runtime category.
use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    keywords::{type_, GROUPS},
    paths::{LazyLocation, Location},
    stack::Stack,
    Definitions,
};

/// Boolean strategy: stops at the first failing keyword.
pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    node: &'s Value,
    instance: &'i Value,
) -> bool {
    let map = match node {
        Value::Object(map) => map,
        Value::Bool(valid) => return *valid,
        _ => return true,
    };
    stack.push(node);
    let valid = check_keywords(stack, ctx, map, instance);
    stack.pop(node);
    valid
}

fn check_keywords<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    map: &'s Map<String, Value>,
    instance: &'i Value,
) -> bool {
    for group in &GROUPS {
        if group.guard.is_some_and(|family| !family.admits(instance)) {
            continue;
        }
        for keyword in group.keywords {
            if let Some(value) = map.get(keyword.name) {
                if !(keyword.check)(stack, ctx, map, value, instance) {
                    return false;
                }
            }
        }
    }
    true
}

/// Error-collecting strategy: every applicable keyword runs even after a failure.
pub(crate) fn error<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    node: &'s Value,
    instance: &'i Value,
) -> bool {
    let map = match node {
        Value::Object(map) => map,
        Value::Bool(true) => return true,
        Value::Bool(false) => {
            return ctx.add_error(ValidationError::new(
                ValidationErrorKind::FalseSchema,
                location.clone(),
                path.into(),
                instance,
            ))
        }
        _ => return true,
    };
    stack.push(node);
    let mut valid = true;
    for group in &GROUPS {
        let admitted = group.guard.is_none_or(|family| family.admits(instance));
        for keyword in group.keywords {
            let Some(value) = map.get(keyword.name) else {
                continue;
            };
            if admitted {
                let result = (keyword.error)(stack, ctx, location, path, map, value, instance);
                if stack.is_tracing() {
                    stack.trace(path, &location.join(keyword.name), keyword.name, result);
                }
                valid &= result;
            } else if stack.is_tracing() {
                stack.trace(path, &location.join(keyword.name), keyword.name, None::<bool>);
            }
        }
    }
    stack.pop(node);
    valid
}

/// Compiled strategy: lower a node into an expression tree.
pub(crate) fn build<'s>(session: &mut BuildSession<'s>, node: &'s Value) -> Expr {
    let map = match node {
        Value::Object(map) => map,
        Value::Bool(false) => return Expr::False,
        _ => return Expr::True,
    };
    session.stack.push(node);
    let declared = map.get("type").and_then(type_::parse);
    let mut exprs = Vec::new();
    for group in &GROUPS {
        let mut members = Vec::new();
        for keyword in group.keywords {
            if let Some(value) = map.get(keyword.name) {
                match (keyword.build)(session, map, value) {
                    Expr::True => {}
                    expr => members.push(expr),
                }
            }
        }
        if members.is_empty() {
            continue;
        }
        match group.guard {
            Some(family) if !family.is_pinned_by(declared) => {
                exprs.push(Expr::Guard(family, Box::new(Expr::all(members))));
            }
            _ => exprs.extend(members),
        }
    }
    session.stack.pop(node);
    Expr::all(exprs)
}

const UNEVALUATED: [&str; 2] = ["unevaluatedProperties", "unevaluatedItems"];
const DATA_KEYWORDS: [&str; 4] = ["const", "default", "enum", "examples"];

/// Whether evaluated locations must be recorded for a validation call.
///
/// Conservative: any occurrence of an unevaluated keyword in the schema or in a named definition
/// enables tracking for the whole call.
pub(crate) fn requires_tracking(root: &Value, definitions: &Definitions) -> bool {
    mentions_unevaluated(root) || definitions.values().any(mentions_unevaluated)
}

fn mentions_unevaluated(node: &Value) -> bool {
    match node {
        Value::Object(map) => map.iter().any(|(key, value)| {
            UNEVALUATED.contains(&key.as_str())
                || (!DATA_KEYWORDS.contains(&key.as_str()) && mentions_unevaluated(value))
        }),
        Value::Array(items) => items.iter().any(mentions_unevaluated),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::requires_tracking;
    use crate::{tests_util, Definitions};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"unevaluatedProperties": false}), true)]
    #[test_case(&json!({"allOf": [{"items": {"unevaluatedItems": false}}]}), true)]
    #[test_case(&json!({"const": {"unevaluatedProperties": false}}), false)]
    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), false)]
    #[test_case(&json!(true), false)]
    fn tracking(schema: &Value, expected: bool) {
        assert_eq!(requires_tracking(schema, &Definitions::new()), expected);
    }

    #[test]
    fn tracking_from_definitions() {
        let mut definitions = Definitions::new();
        definitions.insert("A".into(), json!({"unevaluatedItems": false}));
        assert!(requires_tracking(&json!({"$ref": "A"}), &definitions));
    }

    #[test_case(&json!(true), &json!(1), true)]
    #[test_case(&json!(false), &json!(1), false)]
    #[test_case(&json!({}), &json!([1, "a"]), true)]
    #[test_case(&json!(42), &json!("anything"), true)]
    #[test_case(&json!({"minLength": 2}), &json!(1), true; "string keywords ignore numbers")]
    #[test_case(&json!({"minLength": 2, "type": "string"}), &json!(1), false)]
    #[test_case(&json!({"maximum": 2}), &json!("abc"), true)]
    #[test_case(&json!({"required": ["a"]}), &json!([]), true)]
    #[test_case(&json!({"x-unknown": {"type": "string"}}), &json!(1), true; "unknown keywords are annotations")]
    fn dispatch(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn false_schema_location() {
        tests_util::assert_schema_location(
            &json!({"properties": {"a": false}}),
            &json!({"a": 1}),
            "/properties/a",
        );
    }

    #[test]
    fn every_failing_keyword_is_reported() {
        let schema = json!({"minLength": 5, "pattern": "^[0-9]+$", "format": "email"});
        let instance = json!("abc");
        let (valid, errors) = crate::errors(&Definitions::new(), &schema, &instance);
        assert!(!valid);
        let keywords: Vec<_> = errors.iter().map(|error| error.keyword()).collect();
        assert_eq!(keywords, vec!["minLength", "pattern", "format"]);
    }
}
