//! `$ref`, `$recursiveRef` and `$dynamicRef`.
//!
//! A resolved target is evaluated inside the lexical scope that encloses it, on a fork of the
//! current context that is merged back when the target passes.
use referencing::Resolved;
use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{Context, ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    paths::{LazyLocation, Location},
    schema,
    stack::Stack,
};

fn check_resolved<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    resolved: Result<Resolved<'s>, referencing::Error>,
    instance: &'i Value,
) -> bool {
    let Ok(resolved) = resolved else {
        return false;
    };
    stack.enter(&resolved);
    let mut fork = ctx.fork();
    let valid = schema::check(stack, &mut fork, resolved.contents(), instance);
    stack.leave();
    if valid {
        ctx.merge(fork);
    }
    valid
}

#[allow(clippy::too_many_arguments)]
fn error_resolved<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    reference: &str,
    resolved: Result<Resolved<'s>, referencing::Error>,
    instance: &'i Value,
) -> bool {
    let resolved = match resolved {
        Ok(resolved) => resolved,
        Err(error) => {
            return ctx.add_error(ValidationError::new(
                ValidationErrorKind::UnresolvedReference {
                    reference: reference.to_string(),
                    reason: error.to_string(),
                },
                location.clone(),
                path.into(),
                instance,
            ))
        }
    };
    stack.enter(&resolved);
    let mut fork = ctx.fork();
    let valid = schema::error(stack, &mut fork, location, path, resolved.contents(), instance);
    stack.leave();
    if valid {
        ctx.merge(fork);
    } else {
        ctx.append_errors(fork);
    }
    valid
}

fn build_resolved<'s>(
    session: &mut BuildSession<'s>,
    reference: &str,
    resolved: Result<Resolved<'s>, referencing::Error>,
) -> Expr {
    match resolved {
        Ok(resolved) => Expr::Reference(session.subroutine(&resolved)),
        Err(error) => Expr::Unresolved(format!("{reference}: {error}")),
    }
}

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::String(reference) = schema else {
        return true;
    };
    let resolved = stack.resolve_ref(reference);
    check_resolved(stack, ctx, resolved, instance)
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
    let Value::String(reference) = schema else {
        return true;
    };
    let resolved = stack.resolve_ref(reference);
    error_resolved(
        stack,
        ctx,
        &location.join("$ref"),
        path,
        reference,
        resolved,
        instance,
    )
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    let Value::String(reference) = schema else {
        return Expr::True;
    };
    let resolved = session.stack.resolve_ref(reference);
    build_resolved(session, reference, resolved)
}

pub(crate) fn check_recursive<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::String(reference) = schema else {
        return true;
    };
    let resolved = stack.resolve_recursive(reference);
    check_resolved(stack, ctx, resolved, instance)
}

pub(crate) fn error_recursive<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::String(reference) = schema else {
        return true;
    };
    let resolved = stack.resolve_recursive(reference);
    error_resolved(
        stack,
        ctx,
        &location.join("$recursiveRef"),
        path,
        reference,
        resolved,
        instance,
    )
}

pub(crate) fn build_recursive<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    let Value::String(reference) = schema else {
        return Expr::True;
    };
    let resolved = session.stack.resolve_recursive(reference);
    build_resolved(session, reference, resolved)
}

// `$dynamicRef` is recognized but never resolves.

pub(crate) fn check_dynamic<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::String(reference) = schema else {
        return true;
    };
    let resolved = stack.resolve_dynamic(reference);
    check_resolved(stack, ctx, resolved, instance)
}

pub(crate) fn error_dynamic<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::String(reference) = schema else {
        return true;
    };
    let resolved = stack.resolve_dynamic(reference);
    error_resolved(
        stack,
        ctx,
        &location.join("$dynamicRef"),
        path,
        reference,
        resolved,
        instance,
    )
}

pub(crate) fn build_dynamic<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    let Value::String(reference) = schema else {
        return Expr::True;
    };
    let resolved = session.stack.resolve_dynamic(reference);
    build_resolved(session, reference, resolved)
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"$defs": {"a": {"type": "integer"}}, "$ref": "#/$defs/a"}), &json!(1), true)]
    #[test_case(&json!({"$defs": {"a": {"type": "integer"}}, "$ref": "#/$defs/a"}), &json!("1"), false)]
    #[test_case(&json!({"$ref": "#/$defs/missing"}), &json!(1), false; "unresolved references fail")]
    #[test_case(&json!({"$dynamicRef": "#meta"}), &json!(1), false; "dynamic references never resolve")]
    #[test_case(&json!({"properties": {"a": {"$ref": "#"}}, "type": "object"}), &json!({"a": {"a": {}}}), true; "recursion through the root")]
    #[test_case(&json!({"properties": {"a": {"$ref": "#"}}, "type": "object"}), &json!({"a": {"a": 1}}), false)]
    #[test_case(&json!({"$defs": {"x": {"$anchor": "pos", "minimum": 0}}, "$ref": "#pos"}), &json!(-1), false; "anchor")]
    #[test_case(&json!({"$defs": {"a~b": {"type": "string"}}, "$ref": "#/$defs/a~0b"}), &json!("x"), true; "escaped pointer")]
    fn reference(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test_case(&json!({"next": null}), true)]
    #[test_case(&json!({"next": {"next": {"next": null}}}), true)]
    #[test_case(&json!({"next": {"next": 1}}), false)]
    fn self_referential_definition(instance: &Value, expected: bool) {
        let schema = json!({
            "$defs": {
                "Node": {
                    "type": "object",
                    "properties": {"next": {"anyOf": [{"type": "null"}, {"$ref": "#/$defs/Node"}]}},
                    "required": ["next"]
                }
            },
            "$ref": "#/$defs/Node"
        });
        tests_util::assert_agree(&schema, instance, expected);
    }

    #[test]
    fn embedded_resources() {
        let schema = json!({
            "$id": "http://example.com/root.json",
            "$defs": {
                "item": {"$id": "item.json", "type": "string"}
            },
            "items": {"$ref": "item.json"}
        });
        tests_util::assert_agree(&schema, &json!(["a", "b"]), true);
        tests_util::assert_agree(&schema, &json!(["a", 1]), false);
    }

    #[test]
    fn recursive_reference() {
        let schema = json!({
            "$id": "http://example.com/tree",
            "$recursiveAnchor": true,
            "type": "object",
            "properties": {
                "children": {"type": "array", "items": {"$recursiveRef": "#"}}
            }
        });
        tests_util::assert_agree(&schema, &json!({"children": [{"children": []}]}), true);
        tests_util::assert_agree(&schema, &json!({"children": [1]}), false);
    }

    #[test]
    fn locations() {
        tests_util::assert_schema_location(
            &json!({"$defs": {"a": {"type": "integer"}}, "$ref": "#/$defs/a"}),
            &json!("x"),
            "/$ref/type",
        );
        tests_util::assert_schema_location(&json!({"$ref": "#/nowhere"}), &json!(1), "/$ref");
    }

    #[test]
    fn unresolved_reference_message() {
        let instance = json!(1);
        let (_, errors) = crate::errors(
            &crate::Definitions::new(),
            &json!({"$ref": "#/nowhere"}),
            &instance,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .message()
            .starts_with("Reference \"#/nowhere\" can not be resolved"));
    }

    #[test]
    fn named_definitions() {
        let mut definitions = crate::Definitions::new();
        definitions.insert("Positive".into(), json!({"exclusiveMinimum": 0}));
        let schema = json!({"items": {"$ref": "Positive"}});
        assert!(crate::check(&definitions, &schema, &json!([1, 2])));
        assert!(!crate::check(&definitions, &schema, &json!([1, 0])));
        assert!(crate::compile(&definitions, &schema).is_valid(&json!([3])));
        let instance = json!([0]);
        let (valid, errors) = crate::errors(&definitions, &schema, &instance);
        assert!(!valid);
        assert_eq!(errors[0].schema_path().as_str(), "/items/$ref/exclusiveMinimum");
    }
}
