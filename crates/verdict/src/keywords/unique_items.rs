use ahash::AHashMap;
use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    ext::{cmp, hash},
    paths::{LazyLocation, Location},
    stack::Stack,
};

// Below this size pairwise comparison beats hashing.
const ITEMS_SIZE_THRESHOLD: usize = 15;

/// Whether all elements are pairwise distinct under structural equality.
pub(crate) fn is_unique(items: &[Value]) -> bool {
    let size = items.len();
    if size <= 1 {
        true
    } else if size <= ITEMS_SIZE_THRESHOLD {
        items
            .iter()
            .enumerate()
            .all(|(idx, item)| items[..idx].iter().all(|other| !cmp::equal(item, other)))
    } else {
        let mut buckets: AHashMap<u64, Vec<&Value>> = AHashMap::with_capacity(size);
        for item in items {
            let bucket = buckets.entry(hash::hash_value(item)).or_default();
            if bucket.iter().any(|other| cmp::equal(item, other)) {
                return false;
            }
            bucket.push(item);
        }
        true
    }
}

/// Indices of elements equal to some earlier element, in a single hashed pass.
fn duplicates(items: &[Value]) -> Vec<usize> {
    let mut buckets: AHashMap<u64, Vec<&Value>> = AHashMap::with_capacity(items.len());
    let mut duplicates = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let bucket = buckets.entry(hash::hash_value(item)).or_default();
        if bucket.iter().any(|other| cmp::equal(item, other)) {
            duplicates.push(idx);
        } else {
            bucket.push(item);
        }
    }
    duplicates
}

pub(crate) fn check<'s, 'i>(
    _: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match (schema, instance) {
        (Value::Bool(true), Value::Array(items)) => is_unique(items),
        _ => true,
    }
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
    let (Value::Bool(true), Value::Array(items)) = (schema, instance) else {
        return true;
    };
    let duplicates = duplicates(items);
    if duplicates.is_empty() {
        return true;
    }
    ctx.add_error(ValidationError::new(
        ValidationErrorKind::UniqueItems { duplicates },
        location.join("uniqueItems"),
        path.into(),
        instance,
    ))
}

pub(crate) fn build<'s>(_: &mut BuildSession<'s>, _: &'s Map<String, Value>, schema: &'s Value) -> Expr {
    if schema == &Value::Bool(true) {
        Expr::UniqueItems
    } else {
        Expr::True
    }
}

#[cfg(test)]
mod tests {
    use super::{duplicates, is_unique};
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!([1, 2, 3]), true)]
    #[test_case(&json!([1, 1.0]), false; "numbers compare by value")]
    #[test_case(&json!([{"a": 1, "b": 2}, {"b": 2, "a": 1}]), false; "key order is irrelevant")]
    #[test_case(&json!([[1], [true]]), true)]
    #[test_case(&json!([0, false]), true)]
    fn uniqueness(items: &Value, expected: bool) {
        let items = items.as_array().expect("Array");
        assert_eq!(is_unique(items), expected);
    }

    #[test]
    fn large_arrays_use_hashing() {
        let mut items: Vec<Value> = (0..100).map(|i| json!({"id": i})).collect();
        assert!(is_unique(&items));
        items.push(json!({"id": 42.0}));
        assert!(!is_unique(&items));
    }

    #[test]
    fn every_duplicate_is_reported() {
        let items = json!([1, 2, 1, 3, 2, 1]);
        assert_eq!(duplicates(items.as_array().expect("Array")), vec![2, 4, 5]);
    }

    #[test]
    fn duplicates_in_large_arrays() {
        let mut items: Vec<Value> = (0..40).map(|i| json!({"id": i})).collect();
        items.push(json!({"id": 7.0}));
        items.push(json!(3));
        items.push(json!({"id": 39}));
        items.push(json!(3.0));
        assert_eq!(duplicates(&items), vec![40, 42, 43]);
        tests_util::assert_agree(&json!({"uniqueItems": true}), &Value::Array(items), false);
    }

    #[test_case(&json!({"uniqueItems": true}), &json!([1, 2]), true)]
    #[test_case(&json!({"uniqueItems": true}), &json!([1, 1]), false)]
    #[test_case(&json!({"uniqueItems": false}), &json!([1, 1]), true)]
    fn unique_items(schema: &Value, instance: &Value, expected: bool) {
        tests_util::assert_agree(schema, instance, expected);
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(
            &json!({"uniqueItems": true}),
            &json!([1, 1]),
            "/uniqueItems",
        );
    }
}
