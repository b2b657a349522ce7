use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{Context, ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    keywords::helpers::{as_limit, check_child},
    paths::{LazyLocation, Location},
    schema,
    stack::Stack,
};

/// `minContains` (default 1) and `maxContains` read from the enclosing schema.
pub(crate) fn bounds(parent: &Map<String, Value>) -> (u64, Option<u64>) {
    let min = parent.get("minContains").and_then(as_limit).unwrap_or(1);
    let max = parent.get("maxContains").and_then(as_limit);
    (min, max)
}

#[inline]
fn in_bounds(count: u64, min: u64, max: Option<u64>) -> bool {
    count >= min && max.is_none_or(|max| count <= max)
}

/// Count the elements accepted by `matches` and compare against the bounds.
///
/// Matching indices are recorded when the keyword passes. Without tracking the scan stops as
/// soon as the outcome is known.
pub(crate) fn evaluate<'i, C: Context<'i>>(
    ctx: &mut C,
    items: &'i [Value],
    min: u64,
    max: Option<u64>,
    mut matches: impl FnMut(&'i Value) -> bool,
) -> bool {
    if !ctx.tracking() {
        if min == 0 && max.is_none() {
            return true;
        }
        let mut count = 0;
        for item in items {
            if matches(item) {
                count += 1;
                match max {
                    None if count >= min => return true,
                    Some(max) if count > max => return false,
                    _ => {}
                }
            }
        }
        return in_bounds(count, min, max);
    }
    let matched: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| matches(*item))
        .map(|(idx, _)| idx)
        .collect();
    let valid = in_bounds(matched.len() as u64, min, max);
    if valid {
        for idx in matched {
            ctx.add_index(idx);
        }
    }
    valid
}

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::Array(items) = instance else {
        return true;
    };
    let (min, max) = bounds(parent);
    let tracking = ctx.tracking();
    evaluate(ctx, items, min, max, |item| {
        check_child(stack, tracking, schema, item)
    })
}

pub(crate) fn error<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let Value::Array(items) = instance else {
        return true;
    };
    let (min, max) = bounds(parent);
    let tracking = ctx.tracking();
    let matched: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| check_child(stack, tracking, schema, item))
        .map(|(idx, _)| idx)
        .collect();
    let count = matched.len() as u64;
    if in_bounds(count, min, max) {
        for idx in matched {
            ctx.add_index(idx);
        }
        return true;
    }
    let (kind, keyword) = if count < min {
        if parent.contains_key("minContains") {
            (ValidationErrorKind::MinContains { limit: min }, "minContains")
        } else {
            (ValidationErrorKind::Contains, "contains")
        }
    } else {
        (
            ValidationErrorKind::MaxContains {
                limit: max.unwrap_or_default(),
            },
            "maxContains",
        )
    };
    ctx.add_error(ValidationError::new(
        kind,
        location.join(keyword),
        path.into(),
        instance,
    ))
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    let (min, max) = bounds(parent);
    if min == 0 && max.is_none() && !session.tracking() {
        return Expr::True;
    }
    Expr::Contains {
        schema: Box::new(schema::build(session, schema)),
        min,
        max,
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"contains": {"minimum": 5}}), &json!([2, 3, 4]), false)]
    #[test_case(&json!({"contains": {"minimum": 5}}), &json!([3, 4, 5]), true)]
    #[test_case(&json!({"contains": {"minimum": 5}}), &json!([]), false)]
    #[test_case(&json!({"contains": {"minimum": 5}}), &json!({}), true)]
    #[test_case(&json!({"contains": {"const": 1}, "minContains": 2}), &json!([1, 2, 1]), true)]
    #[test_case(&json!({"contains": {"const": 1}, "minContains": 2}), &json!([1, 2]), false)]
    #[test_case(&json!({"contains": {"const": 1}, "maxContains": 1}), &json!([1, 1]), false)]
    #[test_case(&json!({"contains": {"const": 1}, "maxContains": 1}), &json!([1, 2]), true)]
    #[test_case(&json!({"contains": {"const": 1}, "minContains": 0}), &json!([]), true; "zero minimum is always satisfied")]
    #[test_case(&json!({"contains": false, "minContains": 0}), &json!(["a"]), true)]
    fn contains(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test_case(&json!({"contains": {"const": 1}}), &json!([2]), "/contains")]
    #[test_case(&json!({"contains": {"const": 1}, "minContains": 2}), &json!([1]), "/minContains")]
    #[test_case(&json!({"contains": {"const": 1}, "maxContains": 1}), &json!([1, 1]), "/maxContains")]
    fn location(schema: &Value, instance: &Value, expected: &str) {
        tests_util::assert_schema_location(schema, instance, expected);
    }

    #[test]
    fn contains_marks_items_as_evaluated() {
        let schema = json!({"contains": {"type": "string"}, "unevaluatedItems": {"type": "number"}});
        tests_util::assert_agree(&schema, &json!(["a", 1, "b"]), true);
        tests_util::assert_agree(&schema, &json!(["a", true]), false);
    }
}
