use core::fmt;
use std::ops::BitOrAssign;

use serde_json::{Number, Value};

/// Runtime categories a value can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl JsonType {
    /// Whether `value` belongs to this category.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (JsonType::Array, Value::Array(_))
            | (JsonType::Boolean, Value::Bool(_))
            | (JsonType::Null, Value::Null)
            | (JsonType::Number, Value::Number(_))
            | (JsonType::Object, Value::Object(_))
            | (JsonType::String, Value::String(_)) => true,
            (JsonType::Integer, Value::Number(number)) => is_integer(number),
            _ => false,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            JsonType::Array => "array",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Null => "null",
            JsonType::Number => "number",
            JsonType::Object => "object",
            JsonType::String => "string",
        }
    }

    fn bit(self) -> u8 {
        match self {
            JsonType::Array => 1,
            JsonType::Boolean => 1 << 1,
            JsonType::Integer => 1 << 2,
            JsonType::Null => 1 << 3,
            JsonType::Number => 1 << 4,
            JsonType::Object => 1 << 5,
            JsonType::String => 1 << 6,
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for JsonType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "array" => Ok(JsonType::Array),
            "boolean" => Ok(JsonType::Boolean),
            "integer" => Ok(JsonType::Integer),
            "null" => Ok(JsonType::Null),
            "number" => Ok(JsonType::Number),
            "object" => Ok(JsonType::Object),
            "string" => Ok(JsonType::String),
            _ => Err(()),
        }
    }
}

const ALL: [JsonType; 7] = [
    JsonType::Array,
    JsonType::Boolean,
    JsonType::Integer,
    JsonType::Null,
    JsonType::Number,
    JsonType::Object,
    JsonType::String,
];

/// A compact set of [`JsonType`] values.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct JsonTypeSet(u8);

impl JsonTypeSet {
    #[must_use]
    pub const fn empty() -> Self {
        JsonTypeSet(0)
    }

    #[must_use]
    pub fn insert(mut self, ty: JsonType) -> Self {
        self |= ty;
        self
    }

    #[must_use]
    pub fn contains(self, ty: JsonType) -> bool {
        self.0 & ty.bit() != 0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether `value` belongs to any category in the set.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match value {
            Value::Array(_) => self.contains(JsonType::Array),
            Value::Bool(_) => self.contains(JsonType::Boolean),
            Value::Null => self.contains(JsonType::Null),
            Value::Number(number) => {
                self.contains(JsonType::Number)
                    || (self.contains(JsonType::Integer) && is_integer(number))
            }
            Value::Object(_) => self.contains(JsonType::Object),
            Value::String(_) => self.contains(JsonType::String),
        }
    }

    /// The only member of the set, if it has exactly one.
    #[must_use]
    pub fn single(self) -> Option<JsonType> {
        let mut iter = self.iter();
        match (iter.next(), iter.next()) {
            (Some(ty), None) => Some(ty),
            _ => None,
        }
    }

    pub fn iter(self) -> impl Iterator<Item = JsonType> {
        ALL.into_iter().filter(move |ty| self.contains(*ty))
    }
}

impl BitOrAssign<JsonType> for JsonTypeSet {
    fn bitor_assign(&mut self, rhs: JsonType) {
        self.0 |= rhs.bit();
    }
}

impl From<JsonType> for JsonTypeSet {
    fn from(value: JsonType) -> Self {
        JsonTypeSet::empty().insert(value)
    }
}

impl fmt::Debug for JsonTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for JsonTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for ty in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "\"{ty}\"")?;
            first = false;
        }
        Ok(())
    }
}

pub(crate) fn is_integer(number: &Number) -> bool {
    number.is_u64() || number.is_i64() || number.as_f64().is_some_and(|n| n.fract() == 0.)
}

#[cfg(test)]
mod tests {
    use super::{JsonType, JsonTypeSet};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(JsonType::Integer, &json!(1), true)]
    #[test_case(JsonType::Integer, &json!(1.0), true)]
    #[test_case(JsonType::Integer, &json!(1.5), false)]
    #[test_case(JsonType::Number, &json!(1), true)]
    #[test_case(JsonType::String, &json!(1), false)]
    #[test_case(JsonType::Null, &json!(null), true)]
    fn matches(ty: JsonType, value: &Value, expected: bool) {
        assert_eq!(ty.matches(value), expected);
    }

    #[test]
    fn set_operations() {
        let set = JsonTypeSet::empty()
            .insert(JsonType::String)
            .insert(JsonType::Null);
        assert!(set.matches(&json!("a")));
        assert!(set.matches(&json!(null)));
        assert!(!set.matches(&json!(1)));
        assert_eq!(set.single(), None);
        assert_eq!(JsonTypeSet::from(JsonType::Object).single(), Some(JsonType::Object));
        assert_eq!(set.to_string(), "\"null\", \"string\"");
    }
}
