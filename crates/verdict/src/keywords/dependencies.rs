//! `dependentRequired`, `dependentSchemas` and their draft 4-7 predecessor `dependencies`.
use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{Context, ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    paths::{LazyLocation, Location},
    schema,
    stack::Stack,
};

fn names(value: &Value) -> impl Iterator<Item = &str> {
    value.as_array().into_iter().flatten().filter_map(Value::as_str)
}

/// Apply each schema whose trigger property is present to the whole object.
///
/// Each schema runs on a fork that is merged back when it passes.
pub(crate) fn evaluate_schemas<'a, 'i, C, S: 'a>(
    ctx: &mut C,
    object: &Map<String, Value>,
    schemas: impl IntoIterator<Item = (&'a str, &'a S)>,
    mut matches: impl FnMut(&'a S, &mut C) -> bool,
) -> bool
where
    C: Context<'i>,
{
    for (property, schema) in schemas {
        if object.contains_key(property) {
            let mut fork = ctx.fork();
            if !matches(schema, &mut fork) {
                return false;
            }
            ctx.merge(fork);
        }
    }
    true
}

fn check_required_entries<'s>(
    object: &Map<String, Value>,
    entries: impl IntoIterator<Item = (&'s String, &'s Value)>,
) -> bool {
    entries.into_iter().all(|(property, required)| {
        !object.contains_key(property) || names(required).all(|name| object.contains_key(name))
    })
}

fn error_required_entries<'s, 'i>(
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    entries: impl IntoIterator<Item = (&'s String, &'s Value)>,
    instance: &'i Value,
) -> bool {
    let Value::Object(object) = instance else {
        return true;
    };
    let mut valid = true;
    for (property, required) in entries {
        if !object.contains_key(property) {
            continue;
        }
        for name in names(required) {
            if !object.contains_key(name) {
                valid = ctx.add_error(ValidationError::new(
                    ValidationErrorKind::DependentRequired {
                        property: property.clone(),
                        missing: name.to_string(),
                    },
                    location.join(property),
                    path.into(),
                    instance,
                ));
            }
        }
    }
    valid
}

fn build_required_entries<'s>(
    entries: impl IntoIterator<Item = (&'s String, &'s Value)>,
) -> Expr {
    let dependencies: Vec<(String, Vec<String>)> = entries
        .into_iter()
        .map(|(property, required)| {
            (
                property.clone(),
                names(required).map(str::to_string).collect::<Vec<_>>(),
            )
        })
        .filter(|(_, required)| !required.is_empty())
        .collect();
    if dependencies.is_empty() {
        Expr::True
    } else {
        Expr::DependentRequired(dependencies)
    }
}

fn check_schema_entries<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    entries: impl IntoIterator<Item = (&'s String, &'s Value)>,
    instance: &'i Value,
) -> bool {
    let Value::Object(object) = instance else {
        return true;
    };
    evaluate_schemas(
        ctx,
        object,
        entries
            .into_iter()
            .map(|(property, schema)| (property.as_str(), schema)),
        |schema, fork| schema::check(stack, fork, schema, instance),
    )
}

fn error_schema_entries<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    entries: impl IntoIterator<Item = (&'s String, &'s Value)>,
    instance: &'i Value,
) -> bool {
    let Value::Object(object) = instance else {
        return true;
    };
    let mut valid = true;
    for (property, schema) in entries {
        if !object.contains_key(property) {
            continue;
        }
        let mut fork = ctx.fork();
        if schema::error(stack, &mut fork, &location.join(property), path, schema, instance) {
            ctx.merge(fork);
        } else {
            ctx.append_errors(fork);
            valid = false;
        }
    }
    valid
}

fn build_schema_entries<'s>(
    session: &mut BuildSession<'s>,
    entries: impl IntoIterator<Item = (&'s String, &'s Value)>,
) -> Expr {
    let schemas: Vec<(String, Expr)> = entries
        .into_iter()
        .map(|(property, schema)| (property.clone(), schema::build(session, schema)))
        .collect();
    if !session.tracking() && schemas.iter().all(|(_, expr)| matches!(expr, Expr::True)) {
        return Expr::True;
    }
    Expr::DependentSchemas(schemas)
}

fn entries(schema: &Value) -> impl Iterator<Item = (&String, &Value)> {
    schema.as_object().into_iter().flatten()
}

pub(crate) fn check_required<'s, 'i>(
    _: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match instance {
        Value::Object(object) => check_required_entries(object, entries(schema)),
        _ => true,
    }
}

pub(crate) fn error_required<'s, 'i>(
    _: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    error_required_entries(
        ctx,
        &location.join("dependentRequired"),
        path,
        entries(schema),
        instance,
    )
}

pub(crate) fn build_required<'s>(
    _: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    build_required_entries(entries(schema))
}

pub(crate) fn check_schemas<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    check_schema_entries(stack, ctx, entries(schema), instance)
}

pub(crate) fn error_schemas<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    error_schema_entries(
        stack,
        ctx,
        &location.join("dependentSchemas"),
        path,
        entries(schema),
        instance,
    )
}

pub(crate) fn build_schemas<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    build_schema_entries(session, entries(schema))
}

// `dependencies` mixes both forms: arrays list required names, anything else is a schema.

pub(crate) fn check_legacy<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::Object(object) = instance else {
        return true;
    };
    check_required_entries(object, entries(schema).filter(|(_, value)| value.is_array()))
        && check_schema_entries(
            stack,
            ctx,
            entries(schema).filter(|(_, value)| !value.is_array()),
            instance,
        )
}

pub(crate) fn error_legacy<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let location = location.join("dependencies");
    let required = error_required_entries(
        ctx,
        &location,
        path,
        entries(schema).filter(|(_, value)| value.is_array()),
        instance,
    );
    let schemas = error_schema_entries(
        stack,
        ctx,
        &location,
        path,
        entries(schema).filter(|(_, value)| !value.is_array()),
        instance,
    );
    required && schemas
}

pub(crate) fn build_legacy<'s>(
    session: &mut BuildSession<'s>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    let required = build_required_entries(entries(schema).filter(|(_, value)| value.is_array()));
    let schemas = build_schema_entries(
        session,
        entries(schema).filter(|(_, value)| !value.is_array()),
    );
    Expr::all(
        [required, schemas]
            .into_iter()
            .filter(|expr| !matches!(expr, Expr::True))
            .collect(),
    )
}
