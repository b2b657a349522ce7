use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{Context, ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    keywords::helpers::check_child,
    paths::{LazyLocation, Location},
    schema,
    stack::Stack,
};

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
    object
        .keys()
        .all(|key| check_child(stack, tracking, schema, &Value::String(key.clone())))
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
    let location = location.join("propertyNames");
    let mut valid = true;
    for key in object.keys() {
        let name = Value::String(key.clone());
        let mut child = ErrorContext::new(ctx.tracking());
        if schema::error(stack, &mut child, &location, path, schema, &name) {
            continue;
        }
        valid = false;
        ctx.extend_errors(
            child
                .into_errors()
                .into_iter()
                .map(|error| -> ValidationError<'i> { error.to_owned() }),
        );
        ctx.add_error(ValidationError::new(
            ValidationErrorKind::PropertyNames {
                property: key.clone(),
            },
            location.clone(),
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
    match schema::build(session, schema) {
        Expr::True => Expr::True,
        expr => Expr::PropertyNames(Box::new(expr)),
    }
}
