//! Canonical structural hashing of JSON values.
//!
//! Values that compare equal under [`crate::ext::cmp::equal`] hash equally, so `1` and `1.0`
//! share a hash, and object hashes do not depend on key order.
use std::hash::{BuildHasher, Hash, Hasher};

use ahash::RandomState;
use serde_json::Value;

fn seeds() -> RandomState {
    RandomState::with_seeds(
        0x243f_6a88_85a3_08d3,
        0x1319_8a2e_0370_7344,
        0xa409_3822_299f_31d0,
        0x082e_fa98_ec4e_6c89,
    )
}

/// Structural hash of a value.
pub(crate) fn hash_value(value: &Value) -> u64 {
    let mut hasher = seeds().build_hasher();
    write_value(&mut hasher, value);
    hasher.finish()
}

/// Structural hash of a value combined with extra scope data.
pub(crate) fn hash_scoped(value: &Value, scope: &[&str]) -> u64 {
    let mut hasher = seeds().build_hasher();
    write_value(&mut hasher, value);
    for part in scope {
        part.hash(&mut hasher);
    }
    hasher.finish()
}

fn write_value<H: Hasher>(hasher: &mut H, value: &Value) {
    match value {
        Value::Null => hasher.write_u8(0),
        Value::Bool(boolean) => {
            hasher.write_u8(1);
            boolean.hash(hasher);
        }
        Value::Number(number) => {
            hasher.write_u8(2);
            let float = number.as_f64().unwrap_or(f64::NAN);
            // `-0.0 == 0.0`
            let float = if float == 0. { 0. } else { float };
            hasher.write_u64(float.to_bits());
        }
        Value::String(string) => {
            hasher.write_u8(3);
            string.hash(hasher);
        }
        Value::Array(items) => {
            hasher.write_u8(4);
            hasher.write_usize(items.len());
            for item in items {
                write_value(hasher, item);
            }
        }
        Value::Object(map) => {
            hasher.write_u8(5);
            hasher.write_usize(map.len());
            let mut combined = 0u64;
            for (key, value) in map {
                let mut entry = seeds().build_hasher();
                key.hash(&mut entry);
                write_value(&mut entry, value);
                combined = combined.wrapping_add(entry.finish());
            }
            hasher.write_u64(combined);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_scoped, hash_value};
    use serde_json::json;

    #[test]
    fn numbers_hash_by_value() {
        assert_eq!(hash_value(&json!(1)), hash_value(&json!(1.0)));
        assert_eq!(hash_value(&json!([0])), hash_value(&json!([-0.0])));
        assert_ne!(hash_value(&json!(1)), hash_value(&json!(2)));
    }

    #[test]
    fn object_key_order_is_irrelevant() {
        let left: serde_json::Value = serde_json::from_str(r#"{"a": 1, "b": 2}"#).expect("Valid JSON");
        let right: serde_json::Value = serde_json::from_str(r#"{"b": 2, "a": 1}"#).expect("Valid JSON");
        assert_eq!(hash_value(&left), hash_value(&right));
    }

    #[test]
    fn distinguishes_kinds() {
        assert_ne!(hash_value(&json!("1")), hash_value(&json!(1)));
        assert_ne!(hash_value(&json!([])), hash_value(&json!({})));
        assert_ne!(hash_value(&json!(null)), hash_value(&json!(false)));
    }

    #[test]
    fn scope_changes_hash() {
        let schema = json!({"$ref": "#/$defs/a"});
        assert_ne!(
            hash_scoped(&schema, &["memory://root/"]),
            hash_scoped(&schema, &["http://example.com/"])
        );
    }
}
