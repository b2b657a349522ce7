//! `~refine`: caller-registered predicates, referenced by name.
//!
//! The keyword value is a list of `{"refine": <name>, "message": <text>}` entries and passes when
//! every named predicate accepts the value. A name without a registered predicate fails.
use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    paths::{LazyLocation, Location},
    stack::Stack,
};

/// `(name, message)` of every well-formed entry.
fn entries(schema: &Value) -> impl Iterator<Item = (&str, Option<&str>)> {
    schema
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|entry| {
            let name = entry.get("refine")?.as_str()?;
            Some((name, entry.get("message").and_then(Value::as_str)))
        })
}

fn accepts(stack: &Stack<'_, '_>, name: &str, instance: &Value) -> bool {
    stack
        .refinement(name)
        .is_some_and(|refinement| refinement.refine(instance))
}

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    entries(schema).all(|(name, _)| accepts(stack, name, instance))
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
    let location = location.join("~refine");
    let mut valid = true;
    for (index, (name, message)) in entries(schema).enumerate() {
        if accepts(stack, name, instance) {
            continue;
        }
        let message = match (message, stack.refinement(name)) {
            (_, None) => format!("Refinement \"{name}\" is not registered"),
            (Some(message), Some(_)) => message.to_string(),
            (None, Some(_)) => format!("{instance} does not satisfy refinement \"{name}\""),
        };
        valid = ctx.add_error(ValidationError::new(
            ValidationErrorKind::Refine { index, message },
            location.join(index),
            path.into(),
            instance,
        ));
    }
    valid
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    let mut refinements = Vec::new();
    for (name, _) in entries(schema) {
        match session.refinement(name) {
            Some(refinement) => refinements.push(refinement),
            None => return Expr::Unsatisfiable(format!("refinement {name:?} is not registered")),
        }
    }
    if refinements.is_empty() {
        Expr::True
    } else {
        Expr::Refine(refinements)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    fn options() -> crate::ValidationOptions {
        crate::options()
            .with_refinement("even", |value: &Value| {
                value.as_i64().is_some_and(|n| n % 2 == 0)
            })
            .with_refinement("positive", |value: &Value| {
                value.as_f64().is_some_and(|n| n > 0.)
            })
    }

    #[test_case(&json!(4), true)]
    #[test_case(&json!(3), false)]
    #[test_case(&json!(-2), false)]
    fn registered(instance: &Value, expected: bool) {
        let schema = json!({"~refine": [
            {"refine": "even", "message": "must be even"},
            {"refine": "positive", "message": "must be positive"}
        ]});
        let options = options();
        assert_eq!(options.check(&schema, instance), expected);
        assert_eq!(options.compile(&schema).is_valid(instance), expected);
        assert_eq!(options.errors(&schema, instance).0, expected);
    }

    #[test]
    fn unregistered_refinement_fails() {
        let schema = json!({"~refine": [{"refine": "missing", "message": "never"}]});
        let options = options();
        assert!(!options.check(&schema, &json!(1)));
        assert!(!options.compile(&schema).is_valid(&json!(1)));
        let instance = json!(1);
        let (valid, errors) = options.errors(&schema, &instance);
        assert!(!valid);
        assert_eq!(errors[0].message(), "Refinement \"missing\" is not registered");
    }

    #[test]
    fn failing_entries_are_reported_with_their_message() {
        let schema = json!({"~refine": [
            {"refine": "even", "message": "must be even"},
            {"refine": "positive", "message": "must be positive"}
        ]});
        let instance = json!(-3);
        let (_, errors) = options().errors(&schema, &instance);
        let records: Vec<_> = errors.iter().map(|error| error.to_record()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "must be even");
        assert_eq!(records[1].params, json!({"index": 1, "message": "must be positive"}));
        assert_eq!(records[1].schema_path.as_str(), "/~0refine/1");
    }
}
