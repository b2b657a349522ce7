//! `~standard`: delegate to a caller-registered validator.
//!
//! The keyword value is `{"vendor": <text>, "validate": <name>}`.
use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    paths::{LazyLocation, Location},
    stack::Stack,
};

fn name(schema: &Value) -> Option<&str> {
    schema.get("validate").and_then(Value::as_str)
}

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Some(name) = name(schema) else {
        return true;
    };
    stack
        .standard(name)
        .is_some_and(|validator| validator.validate(instance).is_ok())
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
    let Some(name) = name(schema) else {
        return true;
    };
    let issues = match stack.standard(name) {
        Some(validator) => match validator.validate(instance) {
            Ok(()) => return true,
            Err(issues) => issues.into_iter().map(|issue| issue.message).collect(),
        },
        None => vec![format!("validator \"{name}\" is not registered")],
    };
    let vendor = schema
        .get("vendor")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    ctx.add_error(ValidationError::new(
        ValidationErrorKind::Standard { vendor, issues },
        location.join("~standard"),
        path.into(),
        instance,
    ))
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    let Some(name) = name(schema) else {
        return Expr::True;
    };
    match session.standard(name) {
        Some(validator) => Expr::Standard(validator),
        None => Expr::Unsatisfiable(format!("validator {name:?} is not registered")),
    }
}

#[cfg(test)]
mod tests {
    use crate::StandardIssue;
    use serde_json::{json, Value};

    fn options() -> crate::ValidationOptions {
        crate::options().with_standard("short", |value: &Value| match value.as_str() {
            Some(text) if text.len() > 3 => Err(vec![StandardIssue::new("too long")]),
            Some(_) => Ok(()),
            None => Err(vec![StandardIssue::new("expected a string")]),
        })
    }

    #[test]
    fn delegates_to_registered_validator() {
        let schema = json!({"~standard": {"vendor": "acme", "validate": "short"}});
        let options = options();
        for (instance, expected) in [(json!("abc"), true), (json!("abcd"), false), (json!(1), false)] {
            assert_eq!(options.check(&schema, &instance), expected);
            assert_eq!(options.compile(&schema).is_valid(&instance), expected);
            assert_eq!(options.errors(&schema, &instance).0, expected);
        }
    }

    #[test]
    fn issues_are_reported() {
        let schema = json!({"~standard": {"vendor": "acme", "validate": "short"}});
        let instance = json!("abcd");
        let (_, errors) = options().errors(&schema, &instance);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "\"abcd\" was rejected by the \"acme\" validator: too long"
        );
        assert_eq!(
            errors[0].to_record().params,
            json!({"vendor": "acme", "issues": ["too long"]})
        );
    }

    #[test]
    fn unregistered_validator_fails() {
        let schema = json!({"~standard": {"vendor": "acme", "validate": "missing"}});
        let instance = json!(1);
        let (valid, errors) = crate::options().errors(&schema, &instance);
        assert!(!valid);
        assert_eq!(
            errors[0].to_record().params["issues"],
            json!(["validator \"missing\" is not registered"])
        );
        assert!(!crate::options().compile(&schema).is_valid(&json!(1)));
    }
}
