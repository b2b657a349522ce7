//! Error records produced by the error-collecting strategy.
use core::fmt;
use std::borrow::Cow;

use serde::Serialize;
use serde_json::{json, Value};

use crate::{paths::Location, types::JsonTypeSet};

/// A single keyword violation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError<'a> {
    instance: Cow<'a, Value>,
    kind: ValidationErrorKind,
    schema_path: Location,
    instance_path: Location,
}

/// Kinds of keyword violations, carrying the parameters needed to describe them.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ValidationErrorKind {
    /// Array items beyond the tuple length are not allowed.
    AdditionalItems { limit: usize },
    /// Object keys not covered by `properties` / `patternProperties`.
    AdditionalProperties { unexpected: Vec<String> },
    /// No `anyOf` branch matched.
    AnyOf,
    /// The value differs from `const`.
    Const { expected: Value },
    /// No array element matched `contains`.
    Contains,
    /// Fewer array elements matched `contains` than `minContains`.
    MinContains { limit: u64 },
    /// More array elements matched `contains` than `maxContains`.
    MaxContains { limit: u64 },
    /// `property` is present but `missing` is not.
    DependentRequired { property: String, missing: String },
    /// The value is not one of the `enum` options.
    Enum { options: Value },
    ExclusiveMaximum { limit: Value },
    ExclusiveMinimum { limit: Value },
    /// The `false` schema rejects every value.
    FalseSchema,
    Format { format: String },
    MaxItems { limit: u64 },
    MaxLength { limit: u64 },
    MaxProperties { limit: u64 },
    Maximum { limit: Value },
    MinItems { limit: u64 },
    MinLength { limit: u64 },
    MinProperties { limit: u64 },
    Minimum { limit: Value },
    MultipleOf { multiple_of: Value },
    /// The `not` subschema matched.
    Not { schema: Value },
    /// Zero or several `oneOf` branches matched; `passing` lists them in declaration order.
    OneOf { passing: Vec<usize> },
    Pattern { pattern: String },
    /// A property name failed `propertyNames`.
    PropertyNames { property: String },
    /// A `~refine` predicate rejected the value.
    Refine { index: usize, message: String },
    Required { property: String },
    /// A `~standard` validator rejected the value.
    Standard { vendor: String, issues: Vec<String> },
    Type { expected: JsonTypeSet },
    UnevaluatedItems { unexpected: Vec<usize> },
    UnevaluatedProperties { unexpected: Vec<String> },
    /// Indices of elements equal to an earlier element.
    UniqueItems { duplicates: Vec<usize> },
    /// A reference did not resolve to any schema.
    UnresolvedReference { reference: String, reason: String },
}

impl ValidationErrorKind {
    /// Name of the keyword that failed.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            ValidationErrorKind::AdditionalItems { .. } => "additionalItems",
            ValidationErrorKind::AdditionalProperties { .. } => "additionalProperties",
            ValidationErrorKind::AnyOf => "anyOf",
            ValidationErrorKind::Const { .. } => "const",
            ValidationErrorKind::Contains => "contains",
            ValidationErrorKind::MinContains { .. } => "minContains",
            ValidationErrorKind::MaxContains { .. } => "maxContains",
            ValidationErrorKind::DependentRequired { .. } => "dependentRequired",
            ValidationErrorKind::Enum { .. } => "enum",
            ValidationErrorKind::ExclusiveMaximum { .. } => "exclusiveMaximum",
            ValidationErrorKind::ExclusiveMinimum { .. } => "exclusiveMinimum",
            ValidationErrorKind::FalseSchema => "false",
            ValidationErrorKind::Format { .. } => "format",
            ValidationErrorKind::MaxItems { .. } => "maxItems",
            ValidationErrorKind::MaxLength { .. } => "maxLength",
            ValidationErrorKind::MaxProperties { .. } => "maxProperties",
            ValidationErrorKind::Maximum { .. } => "maximum",
            ValidationErrorKind::MinItems { .. } => "minItems",
            ValidationErrorKind::MinLength { .. } => "minLength",
            ValidationErrorKind::MinProperties { .. } => "minProperties",
            ValidationErrorKind::Minimum { .. } => "minimum",
            ValidationErrorKind::MultipleOf { .. } => "multipleOf",
            ValidationErrorKind::Not { .. } => "not",
            ValidationErrorKind::OneOf { .. } => "oneOf",
            ValidationErrorKind::Pattern { .. } => "pattern",
            ValidationErrorKind::PropertyNames { .. } => "propertyNames",
            ValidationErrorKind::Refine { .. } => "~refine",
            ValidationErrorKind::Required { .. } => "required",
            ValidationErrorKind::Standard { .. } => "~standard",
            ValidationErrorKind::Type { .. } => "type",
            ValidationErrorKind::UnevaluatedItems { .. } => "unevaluatedItems",
            ValidationErrorKind::UnevaluatedProperties { .. } => "unevaluatedProperties",
            ValidationErrorKind::UniqueItems { .. } => "uniqueItems",
            ValidationErrorKind::UnresolvedReference { .. } => "$ref",
        }
    }

    /// Keyword parameters as a JSON object.
    #[must_use]
    pub fn params(&self) -> Value {
        match self {
            ValidationErrorKind::AdditionalItems { limit } => json!({"limit": limit}),
            ValidationErrorKind::AdditionalProperties { unexpected }
            | ValidationErrorKind::UnevaluatedProperties { unexpected } => {
                json!({"properties": unexpected})
            }
            ValidationErrorKind::AnyOf
            | ValidationErrorKind::Contains
            | ValidationErrorKind::FalseSchema => json!({}),
            ValidationErrorKind::Const { expected } => json!({"allowedValue": expected}),
            ValidationErrorKind::MinContains { limit }
            | ValidationErrorKind::MaxContains { limit }
            | ValidationErrorKind::MaxItems { limit }
            | ValidationErrorKind::MaxLength { limit }
            | ValidationErrorKind::MaxProperties { limit }
            | ValidationErrorKind::MinItems { limit }
            | ValidationErrorKind::MinLength { limit }
            | ValidationErrorKind::MinProperties { limit } => json!({"limit": limit}),
            ValidationErrorKind::DependentRequired { property, missing } => {
                json!({"property": property, "missingProperty": missing})
            }
            ValidationErrorKind::Enum { options } => json!({"allowedValues": options}),
            ValidationErrorKind::ExclusiveMaximum { limit }
            | ValidationErrorKind::ExclusiveMinimum { limit }
            | ValidationErrorKind::Maximum { limit }
            | ValidationErrorKind::Minimum { limit } => json!({"limit": limit}),
            ValidationErrorKind::Format { format } => json!({"format": format}),
            ValidationErrorKind::MultipleOf { multiple_of } => {
                json!({"multipleOf": multiple_of})
            }
            ValidationErrorKind::Not { schema } => json!({"schema": schema}),
            ValidationErrorKind::OneOf { passing } => json!({"passingSchemas": passing}),
            ValidationErrorKind::Pattern { pattern } => json!({"pattern": pattern}),
            ValidationErrorKind::PropertyNames { property } => {
                json!({"propertyName": property})
            }
            ValidationErrorKind::Refine { index, message } => {
                json!({"index": index, "message": message})
            }
            ValidationErrorKind::Required { property } => json!({"missingProperty": property}),
            ValidationErrorKind::Standard { vendor, issues } => {
                json!({"vendor": vendor, "issues": issues})
            }
            ValidationErrorKind::Type { expected } => {
                json!({"type": expected.iter().map(|ty| ty.as_str()).collect::<Vec<_>>()})
            }
            ValidationErrorKind::UnevaluatedItems { unexpected } => json!({"items": unexpected}),
            ValidationErrorKind::UniqueItems { duplicates } => {
                json!({"duplicateItems": duplicates})
            }
            ValidationErrorKind::UnresolvedReference { reference, reason } => {
                json!({"reference": reference, "reason": reason})
            }
        }
    }
}

impl<'a> ValidationError<'a> {
    pub(crate) fn new(
        kind: ValidationErrorKind,
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance: Cow::Borrowed(instance),
            kind,
            schema_path,
            instance_path,
        }
    }

    /// The failing value.
    #[must_use]
    pub fn instance(&self) -> &Value {
        &self.instance
    }
    /// What failed and with which parameters.
    #[must_use]
    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }
    /// Name of the keyword that failed.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        self.kind.keyword()
    }
    /// JSON Pointer to the failing keyword within the schema.
    #[must_use]
    pub fn schema_path(&self) -> &Location {
        &self.schema_path
    }
    /// JSON Pointer to the failing value within the instance.
    #[must_use]
    pub fn instance_path(&self) -> &Location {
        &self.instance_path
    }
    /// Default rendering of the error message.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
    /// Detach the error from the validated instance.
    #[must_use]
    pub fn to_owned(self) -> ValidationError<'static> {
        ValidationError {
            instance: Cow::Owned(self.instance.into_owned()),
            kind: self.kind,
            schema_path: self.schema_path,
            instance_path: self.instance_path,
        }
    }
    /// Flatten into a serializable record.
    #[must_use]
    pub fn to_record(&self) -> ErrorRecord {
        ErrorRecord {
            keyword: self.keyword(),
            schema_path: self.schema_path.clone(),
            instance_path: self.instance_path.clone(),
            params: self.kind.params(),
            message: self.message(),
        }
    }
}

/// Serializable form of a [`ValidationError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub keyword: &'static str,
    pub schema_path: Location,
    pub instance_path: Location,
    pub params: Value,
    pub message: String,
}

impl std::error::Error for ValidationError<'_> {}

fn write_quoted_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    let mut iter = items.iter();
    if let Some(first) = iter.next() {
        write!(f, "'{first}'")?;
        for item in iter {
            write!(f, ", '{item}'")?;
        }
    }
    Ok(())
}

impl fmt::Display for ValidationError<'_> {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instance = &self.instance;
        match &self.kind {
            ValidationErrorKind::AdditionalItems { limit } => {
                write!(f, "Additional items are not allowed beyond index {limit}")
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                f.write_str("Additional properties are not allowed (")?;
                write_quoted_list(f, unexpected)?;
                if unexpected.len() == 1 {
                    f.write_str(" was unexpected)")
                } else {
                    f.write_str(" were unexpected)")
                }
            }
            ValidationErrorKind::AnyOf => write!(
                f,
                "{instance} is not valid under any of the schemas listed in the 'anyOf' keyword"
            ),
            ValidationErrorKind::Const { expected } => write!(f, "{expected} was expected"),
            ValidationErrorKind::Contains => write!(
                f,
                "None of {instance} are valid under the given schema"
            ),
            ValidationErrorKind::MinContains { limit } => write!(
                f,
                "{instance} has fewer than {limit} items matching the given schema"
            ),
            ValidationErrorKind::MaxContains { limit } => write!(
                f,
                "{instance} has more than {limit} items matching the given schema"
            ),
            ValidationErrorKind::DependentRequired { property, missing } => write!(
                f,
                "\"{missing}\" is a required property when \"{property}\" is present"
            ),
            ValidationErrorKind::Enum { options } => write!(f, "{instance} is not one of {options}"),
            ValidationErrorKind::ExclusiveMaximum { limit } => write!(
                f,
                "{instance} is greater than or equal to the maximum of {limit}"
            ),
            ValidationErrorKind::ExclusiveMinimum { limit } => write!(
                f,
                "{instance} is less than or equal to the minimum of {limit}"
            ),
            ValidationErrorKind::FalseSchema => {
                write!(f, "False schema does not allow {instance}")
            }
            ValidationErrorKind::Format { format } => write!(f, "{instance} is not a \"{format}\""),
            ValidationErrorKind::MaxItems { limit } => {
                write!(f, "{instance} has more than {limit} item")?;
                if *limit != 1 {
                    f.write_str("s")?;
                }
                Ok(())
            }
            ValidationErrorKind::MinItems { limit } => {
                write!(f, "{instance} has less than {limit} item")?;
                if *limit != 1 {
                    f.write_str("s")?;
                }
                Ok(())
            }
            ValidationErrorKind::MaxLength { limit } => {
                write!(f, "{instance} is longer than {limit} character")?;
                if *limit != 1 {
                    f.write_str("s")?;
                }
                Ok(())
            }
            ValidationErrorKind::MinLength { limit } => {
                write!(f, "{instance} is shorter than {limit} character")?;
                if *limit != 1 {
                    f.write_str("s")?;
                }
                Ok(())
            }
            ValidationErrorKind::MaxProperties { limit } => {
                write!(f, "{instance} has more than {limit} propert")?;
                f.write_str(if *limit == 1 { "y" } else { "ies" })
            }
            ValidationErrorKind::MinProperties { limit } => {
                write!(f, "{instance} has less than {limit} propert")?;
                f.write_str(if *limit == 1 { "y" } else { "ies" })
            }
            ValidationErrorKind::Maximum { limit } => {
                write!(f, "{instance} is greater than the maximum of {limit}")
            }
            ValidationErrorKind::Minimum { limit } => {
                write!(f, "{instance} is less than the minimum of {limit}")
            }
            ValidationErrorKind::MultipleOf { multiple_of } => {
                write!(f, "{instance} is not a multiple of {multiple_of}")
            }
            ValidationErrorKind::Not { schema } => {
                write!(f, "{schema} is not allowed for {instance}")
            }
            ValidationErrorKind::OneOf { passing } if passing.is_empty() => write!(
                f,
                "{instance} is not valid under any of the schemas listed in the 'oneOf' keyword"
            ),
            ValidationErrorKind::OneOf { passing } => {
                write!(f, "{instance} is valid under more than one of the schemas listed in the 'oneOf' keyword (")?;
                write_quoted_list(f, passing)?;
                f.write_str(")")
            }
            ValidationErrorKind::Pattern { pattern } => {
                write!(f, "{instance} does not match \"{pattern}\"")
            }
            ValidationErrorKind::PropertyNames { property } => {
                write!(f, "Property name \"{property}\" is invalid")
            }
            ValidationErrorKind::Refine { message, .. } => f.write_str(message),
            ValidationErrorKind::Required { property } => {
                write!(f, "\"{property}\" is a required property")
            }
            ValidationErrorKind::Standard { vendor, issues } => {
                write!(f, "{instance} was rejected by the \"{vendor}\" validator")?;
                if !issues.is_empty() {
                    f.write_str(": ")?;
                    f.write_str(&issues.join("; "))?;
                }
                Ok(())
            }
            ValidationErrorKind::Type { expected } => {
                if expected.single().is_some() {
                    write!(f, "{instance} is not of type {expected}")
                } else {
                    write!(f, "{instance} is not of types {expected}")
                }
            }
            ValidationErrorKind::UnevaluatedItems { unexpected } => {
                f.write_str("Unevaluated items are not allowed (")?;
                write_quoted_list(f, unexpected)?;
                f.write_str(if unexpected.len() == 1 {
                    " was unexpected)"
                } else {
                    " were unexpected)"
                })
            }
            ValidationErrorKind::UnevaluatedProperties { unexpected } => {
                f.write_str("Unevaluated properties are not allowed (")?;
                write_quoted_list(f, unexpected)?;
                f.write_str(if unexpected.len() == 1 {
                    " was unexpected)"
                } else {
                    " were unexpected)"
                })
            }
            ValidationErrorKind::UniqueItems { .. } => {
                write!(f, "{instance} has non-unique elements")
            }
            ValidationErrorKind::UnresolvedReference { reference, reason } => {
                write!(f, "Reference \"{reference}\" can not be resolved: {reason}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ValidationError, ValidationErrorKind};
    use crate::{
        paths::Location,
        types::{JsonType, JsonTypeSet},
    };
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(ValidationErrorKind::Type { expected: JsonTypeSet::from(JsonType::String) }, &json!(1), "1 is not of type \"string\"")]
    #[test_case(ValidationErrorKind::MinLength { limit: 1 }, &json!(""), "\"\" is shorter than 1 character")]
    #[test_case(ValidationErrorKind::MaxItems { limit: 2 }, &json!([1, 2, 3]), "[1,2,3] has more than 2 items")]
    #[test_case(ValidationErrorKind::AdditionalProperties { unexpected: vec!["b".into(), "c".into()] }, &json!({}), "Additional properties are not allowed ('b', 'c' were unexpected)")]
    #[test_case(ValidationErrorKind::Required { property: "a".into() }, &json!({}), "\"a\" is a required property")]
    #[test_case(ValidationErrorKind::OneOf { passing: vec![0, 1] }, &json!(1), "1 is valid under more than one of the schemas listed in the 'oneOf' keyword ('0', '1')")]
    fn messages(kind: ValidationErrorKind, instance: &Value, expected: &str) {
        let error = ValidationError::new(kind, Location::new(), Location::new(), instance);
        assert_eq!(error.message(), expected);
    }

    #[test]
    fn record() {
        let instance = json!([1, 1]);
        let error = ValidationError::new(
            ValidationErrorKind::UniqueItems { duplicates: vec![1] },
            Location::new().join("uniqueItems"),
            Location::new(),
            &instance,
        );
        let record = error.to_record();
        assert_eq!(record.keyword, "uniqueItems");
        assert_eq!(record.params, json!({"duplicateItems": [1]}));
        let serialized = serde_json::to_value(&record).expect("Serializable");
        assert_eq!(serialized["schemaPath"], json!("/uniqueItems"));
        assert_eq!(serialized["instancePath"], json!(""));
    }

    #[test]
    fn owned() {
        let error = {
            let instance = json!("x");
            ValidationError::new(
                ValidationErrorKind::FalseSchema,
                Location::new(),
                Location::new(),
                &instance,
            )
            .to_owned()
        };
        assert_eq!(error.instance(), &json!("x"));
    }
}
