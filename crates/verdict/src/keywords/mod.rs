//! Keyword modules and the table the dispatcher walks.
//!
//! Every keyword exposes the same three entry points: `check` for the boolean strategy, `error`
//! for the error-collecting one and `build` for the compiled one. Entry points receive the
//! enclosing schema object too, because some keywords read their siblings (`minContains`,
//! `prefixItems`, the draft 4 boolean `exclusiveMinimum`, ...).
pub(crate) mod additional_items;
pub(crate) mod additional_properties;
pub(crate) mod all_of;
pub(crate) mod any_of;
pub(crate) mod const_;
pub(crate) mod contains;
pub(crate) mod dependencies;
pub(crate) mod enum_;
pub(crate) mod exclusive_maximum;
pub(crate) mod exclusive_minimum;
pub(crate) mod format;
pub(crate) mod helpers;
pub(crate) mod if_;
pub(crate) mod items;
pub(crate) mod max_items;
pub(crate) mod max_length;
pub(crate) mod max_properties;
pub(crate) mod maximum;
pub(crate) mod min_items;
pub(crate) mod min_length;
pub(crate) mod min_properties;
pub(crate) mod minimum;
pub(crate) mod multiple_of;
pub(crate) mod not;
pub(crate) mod one_of;
pub(crate) mod pattern;
pub(crate) mod pattern_properties;
pub(crate) mod prefix_items;
pub(crate) mod properties;
pub(crate) mod property_names;
pub(crate) mod ref_;
pub(crate) mod refine;
pub(crate) mod required;
pub(crate) mod standard;
pub(crate) mod type_;
pub(crate) mod unevaluated_items;
pub(crate) mod unevaluated_properties;
pub(crate) mod unique_items;

use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    paths::{LazyLocation, Location},
    stack::Stack,
    types::{JsonType, JsonTypeSet},
};

pub(crate) type CheckFn = for<'s, 't, 'i> fn(
    &mut Stack<'s, 't>,
    &mut EvaluationContext<'i>,
    &'s Map<String, Value>,
    &'s Value,
    &'i Value,
) -> bool;

/// Receives the location of the enclosing schema node, not of the keyword itself.
pub(crate) type ErrorFn = for<'s, 't, 'i> fn(
    &mut Stack<'s, 't>,
    &mut ErrorContext<'i>,
    &Location,
    &LazyLocation<'_, '_>,
    &'s Map<String, Value>,
    &'s Value,
    &'i Value,
) -> bool;

pub(crate) type BuildFn = for<'s> fn(&mut BuildSession<'s>, &'s Map<String, Value>, &'s Value) -> Expr;

pub(crate) struct Keyword {
    pub(crate) name: &'static str,
    pub(crate) check: CheckFn,
    pub(crate) error: ErrorFn,
    pub(crate) build: BuildFn,
}

macro_rules! keyword {
    ($name:literal, $module:ident) => {
        Keyword {
            name: $name,
            check: $module::check,
            error: $module::error,
            build: $module::build,
        }
    };
    ($name:literal, $module:ident :: { $check:ident, $error:ident, $build:ident }) => {
        Keyword {
            name: $name,
            check: $module::$check,
            error: $module::$error,
            build: $module::$build,
        }
    };
}

/// Runtime category a group of keywords applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Family {
    Object,
    Array,
    String,
    Number,
}

impl Family {
    #[inline]
    pub(crate) fn admits(self, instance: &Value) -> bool {
        matches!(
            (self, instance),
            (Family::Object, Value::Object(_))
                | (Family::Array, Value::Array(_))
                | (Family::String, Value::String(_))
                | (Family::Number, Value::Number(_))
        )
    }

    /// Whether a declared `type` already restricts values to this family alone.
    pub(crate) fn is_pinned_by(self, declared: Option<JsonTypeSet>) -> bool {
        let Some(declared) = declared else {
            return false;
        };
        match self {
            Family::Object => declared == JsonTypeSet::from(JsonType::Object),
            Family::Array => declared == JsonTypeSet::from(JsonType::Array),
            Family::String => declared == JsonTypeSet::from(JsonType::String),
            Family::Number => {
                !declared.is_empty()
                    && declared
                        .iter()
                        .all(|ty| matches!(ty, JsonType::Number | JsonType::Integer))
            }
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Family::Object => "object",
            Family::Array => "array",
            Family::String => "string",
            Family::Number => "number",
        }
    }
}

/// Keywords evaluated together; guarded ones only apply to values of one family.
pub(crate) struct Group {
    pub(crate) guard: Option<Family>,
    pub(crate) keywords: &'static [Keyword],
}

/// Every supported keyword in evaluation order.
///
/// `required` precedes `properties`, and the unevaluated keywords run after every other
/// keyword that can record evaluated locations.
pub(crate) static GROUPS: [Group; 9] = [
    Group {
        guard: None,
        keywords: &[keyword!("type", type_)],
    },
    Group {
        guard: Some(Family::Object),
        keywords: &[
            keyword!("required", required),
            keyword!("properties", properties),
            keyword!("patternProperties", pattern_properties),
            keyword!("additionalProperties", additional_properties),
            keyword!("propertyNames", property_names),
            keyword!(
                "dependentRequired",
                dependencies::{check_required, error_required, build_required}
            ),
            keyword!(
                "dependentSchemas",
                dependencies::{check_schemas, error_schemas, build_schemas}
            ),
            keyword!(
                "dependencies",
                dependencies::{check_legacy, error_legacy, build_legacy}
            ),
            keyword!("minProperties", min_properties),
            keyword!("maxProperties", max_properties),
        ],
    },
    Group {
        guard: Some(Family::Array),
        keywords: &[
            keyword!("minItems", min_items),
            keyword!("maxItems", max_items),
            keyword!("uniqueItems", unique_items),
            keyword!("prefixItems", prefix_items),
            keyword!("items", items),
            keyword!("additionalItems", additional_items),
            keyword!("contains", contains),
        ],
    },
    Group {
        guard: Some(Family::String),
        keywords: &[
            keyword!("minLength", min_length),
            keyword!("maxLength", max_length),
            keyword!("pattern", pattern),
            keyword!("format", format),
        ],
    },
    Group {
        guard: Some(Family::Number),
        keywords: &[
            keyword!("minimum", minimum),
            keyword!("maximum", maximum),
            keyword!("exclusiveMinimum", exclusive_minimum),
            keyword!("exclusiveMaximum", exclusive_maximum),
            keyword!("multipleOf", multiple_of),
        ],
    },
    Group {
        guard: None,
        keywords: &[
            keyword!("$ref", ref_),
            keyword!(
                "$recursiveRef",
                ref_::{check_recursive, error_recursive, build_recursive}
            ),
            keyword!(
                "$dynamicRef",
                ref_::{check_dynamic, error_dynamic, build_dynamic}
            ),
            keyword!("const", const_),
            keyword!("enum", enum_),
            keyword!("if", if_),
            keyword!("not", not),
            keyword!("allOf", all_of),
            keyword!("anyOf", any_of),
            keyword!("oneOf", one_of),
        ],
    },
    Group {
        guard: Some(Family::Array),
        keywords: &[keyword!("unevaluatedItems", unevaluated_items)],
    },
    Group {
        guard: Some(Family::Object),
        keywords: &[keyword!("unevaluatedProperties", unevaluated_properties)],
    },
    Group {
        guard: None,
        keywords: &[
            keyword!("~refine", refine),
            keyword!("~standard", standard),
        ],
    },
];
