use std::cmp::Ordering;

use num_cmp::NumCmp;
use serde_json::{Map, Number, Value};

/// Order two numbers by value, regardless of their internal representation.
pub(crate) fn compare_numbers(left: &Number, right: &Number) -> Option<Ordering> {
    if let Some(left) = left.as_u64() {
        if let Some(right) = right.as_u64() {
            Some(left.cmp(&right))
        } else if let Some(right) = right.as_i64() {
            NumCmp::num_cmp(left, right)
        } else {
            NumCmp::num_cmp(left, right.as_f64()?)
        }
    } else if let Some(left) = left.as_i64() {
        if let Some(right) = right.as_u64() {
            NumCmp::num_cmp(left, right)
        } else if let Some(right) = right.as_i64() {
            Some(left.cmp(&right))
        } else {
            NumCmp::num_cmp(left, right.as_f64()?)
        }
    } else {
        let left = left.as_f64()?;
        if let Some(right) = right.as_u64() {
            NumCmp::num_cmp(left, right)
        } else if let Some(right) = right.as_i64() {
            NumCmp::num_cmp(left, right)
        } else {
            left.partial_cmp(&right.as_f64()?)
        }
    }
}

#[inline]
pub(crate) fn equal_numbers(left: &Number, right: &Number) -> bool {
    compare_numbers(left, right) == Some(Ordering::Equal)
}

#[inline]
pub(crate) fn equal_arrays(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| equal(l, r))
}

#[inline]
pub(crate) fn equal_objects(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, value)| right.get(key).is_some_and(|other| equal(value, other)))
}

/// JSON equality: numbers compare by value, so `1` equals `1.0`.
pub(crate) fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Bool(left), Value::Bool(right)) => left == right,
        (Value::Null, Value::Null) => true,
        (Value::Number(left), Value::Number(right)) => equal_numbers(left, right),
        (Value::Array(left), Value::Array(right)) => equal_arrays(left, right),
        (Value::Object(left), Value::Object(right)) => equal_objects(left, right),
        (_, _) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{compare_numbers, equal};
    use serde_json::{json, Number, Value};
    use std::cmp::Ordering;
    use test_case::test_case;

    #[test_case(&json!(1), &json!(1.0), true)]
    #[test_case(&json!(-1), &json!(-1.0), true)]
    #[test_case(&json!(1), &json!(2), false)]
    #[test_case(&json!({"a": [1, 2]}), &json!({"a": [1.0, 2]}), true)]
    #[test_case(&json!({"a": 1}), &json!({"a": 1, "b": 2}), false)]
    #[test_case(&json!([1]), &json!([true]), false)]
    #[test_case(&json!(null), &json!(false), false)]
    fn equality(left: &Value, right: &Value, expected: bool) {
        assert_eq!(equal(left, right), expected);
        assert_eq!(equal(right, left), expected);
    }

    #[test_case(Number::from(u64::MAX), Number::from(-1), Ordering::Greater)]
    #[test_case(Number::from(-5), Number::from(3u64), Ordering::Less)]
    #[test_case(Number::from_f64(2.5).expect("Finite"), Number::from(2), Ordering::Greater)]
    #[test_case(Number::from(3), Number::from_f64(3.0).expect("Finite"), Ordering::Equal)]
    fn ordering(left: Number, right: Number, expected: Ordering) {
        assert_eq!(compare_numbers(&left, &right), Some(expected));
    }
}
