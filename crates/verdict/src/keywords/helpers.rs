#![allow(clippy::float_cmp, clippy::cast_sign_loss, clippy::cast_precision_loss)]

use serde_json::Value;

use crate::{
    context::{Context, ErrorContext, EvaluationContext},
    paths::{LazyLocation, Location},
    schema,
    stack::Stack,
};

/// Non-negative integer keyword value; integer-valued floats such as `2.0` are accepted.
#[inline]
pub(crate) fn as_limit(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let float = value.as_f64()?;
    if float.trunc() == float && float >= 0. && float <= u64::MAX as f64 {
        // NOTE: Imprecise cast as big integers are not supported
        #[allow(clippy::cast_possible_truncation)]
        return Some(float as u64);
    }
    None
}

/// Validate a value nested inside the current instance.
///
/// The nested value gets its own evaluated locations, so nothing is merged back.
#[inline]
pub(crate) fn check_child<'s>(
    stack: &mut Stack<'s, '_>,
    tracking: bool,
    node: &'s Value,
    instance: &Value,
) -> bool {
    schema::check(stack, &mut EvaluationContext::new(tracking), node, instance)
}

/// Error-collecting counterpart of [`check_child`]; the nested errors are appended to `ctx`.
#[inline]
pub(crate) fn error_child<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    node: &'s Value,
    instance: &'i Value,
) -> bool {
    let mut child = ctx.fork();
    let valid = schema::error(stack, &mut child, location, path, node, instance);
    ctx.append_errors(child);
    valid
}
