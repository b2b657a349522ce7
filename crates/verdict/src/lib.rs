//! # verdict
//!
//! Validation of JSON values against JSON-Schema-like documents with three strategies that
//! always agree on the verdict:
//!
//! - [`check`] interprets the schema and stops at the first violation;
//! - [`errors`] interprets the schema and collects every violation with its location;
//! - [`compile`] lowers the schema into a reusable [`Program`].
//!
//! ```rust
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {"name": {"type": "string", "minLength": 1}},
//!     "required": ["name"]
//! });
//! let definitions = verdict::Definitions::new();
//!
//! assert!(verdict::check(&definitions, &schema, &json!({"name": "Alice"})));
//!
//! let instance = json!({"name": ""});
//! let (valid, errors) = verdict::errors(&definitions, &schema, &instance);
//! assert!(!valid);
//! assert_eq!(errors[0].instance_path().as_str(), "/name");
//! assert_eq!(errors[0].schema_path().as_str(), "/properties/name/minLength");
//!
//! let program = verdict::compile(&definitions, &schema);
//! assert!(!program.is_valid(&json!({})));
//! ```
//!
//! # Named definitions
//!
//! `$ref` consults the named definitions by exact name before resolving the reference as a URI
//! inside the schema itself:
//!
//! ```rust
//! use serde_json::json;
//!
//! let options = verdict::options()
//!     .with_definition("Id", json!({"type": "integer", "minimum": 1}));
//! let schema = json!({"type": "array", "items": {"$ref": "Id"}});
//! assert!(options.check(&schema, &json!([1, 2])));
//! assert!(!options.check(&schema, &json!([0])));
//! ```
//!
//! # Extensions
//!
//! Two keywords delegate to code registered on [`ValidationOptions`]: `~refine` runs named
//! predicates and `~standard` runs a named [`StandardValidator`].
mod compiler;
mod context;
mod error;
mod ext;
mod externals;
mod keywords;
mod paths;
mod reducer;
mod regex;
mod schema;
mod stack;
mod tracing;
mod types;

use core::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

pub use crate::{
    compiler::Program,
    error::{ErrorRecord, ValidationError, ValidationErrorKind},
    externals::{External, Externals, Refine, StandardIssue, StandardValidator},
    paths::{LazyLocation, Location, LocationSegment},
    regex::Pattern,
    tracing::{NodeEvaluationResult, TracingCallback, TracingContext},
    types::{JsonType, JsonTypeSet},
};

use crate::{
    compiler::BuildSession,
    context::{ErrorContext, EvaluationContext},
    stack::{Environment, Registry, Stack},
};

/// Named schemas available to `$ref` by exact name.
pub type Definitions = Map<String, Value>;

const DEFAULT_MAX_ERRORS: usize = 64;

/// Configuration shared by every strategy.
#[derive(Clone)]
pub struct ValidationOptions {
    definitions: Definitions,
    registry: Registry,
    max_errors: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            definitions: Definitions::new(),
            registry: Registry::default(),
            max_errors: DEFAULT_MAX_ERRORS,
        }
    }
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut refinements: Vec<_> = self.registry.refinements.keys().collect();
        refinements.sort_unstable();
        let mut standards: Vec<_> = self.registry.standards.keys().collect();
        standards.sort_unstable();
        f.debug_struct("ValidationOptions")
            .field("definitions", &self.definitions.keys().collect::<Vec<_>>())
            .field("refinements", &refinements)
            .field("standards", &standards)
            .field("max_errors", &self.max_errors)
            .finish()
    }
}

impl ValidationOptions {
    /// Make `schema` available to `$ref` as `name`.
    #[must_use]
    pub fn with_definition(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.definitions.insert(name.into(), schema);
        self
    }

    #[must_use]
    pub fn with_definitions(
        mut self,
        definitions: impl IntoIterator<Item = (impl Into<String>, Value)>,
    ) -> Self {
        for (name, schema) in definitions {
            self.definitions.insert(name.into(), schema);
        }
        self
    }

    /// Register a predicate for `~refine` entries naming it.
    #[must_use]
    pub fn with_refinement(
        mut self,
        name: impl Into<String>,
        refinement: impl Refine + 'static,
    ) -> Self {
        self.registry
            .refinements
            .insert(name.into(), Arc::new(refinement));
        self
    }

    /// Register a validator for `~standard` keywords naming it.
    #[must_use]
    pub fn with_standard(
        mut self,
        name: impl Into<String>,
        validator: impl StandardValidator + 'static,
    ) -> Self {
        self.registry
            .standards
            .insert(name.into(), Arc::new(validator));
        self
    }

    /// Maximum number of errors returned by [`ValidationOptions::errors`]. Defaults to 64.
    ///
    /// The verdict is not affected by the bound.
    #[must_use]
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    fn environment(&self) -> Environment<'_> {
        Environment {
            definitions: &self.definitions,
            registry: &self.registry,
        }
    }

    /// Validate `instance`, stopping at the first violation.
    #[must_use]
    pub fn check(&self, schema: &Value, instance: &Value) -> bool {
        run_check(self.environment(), schema, instance)
    }

    /// Validate `instance` and collect violations in discovery order.
    #[must_use]
    pub fn errors<'i>(
        &self,
        schema: &Value,
        instance: &'i Value,
    ) -> (bool, Vec<ValidationError<'i>>) {
        run_errors(self.environment(), schema, instance, self.max_errors, None)
    }

    /// Validate `instance`, reporting every evaluated keyword to `callback`.
    ///
    /// ```rust
    /// use serde_json::json;
    /// use verdict::NodeEvaluationResult;
    ///
    /// let schema = json!({"minimum": 5, "minLength": 2});
    /// let mut seen = Vec::new();
    /// let valid = verdict::options().trace(&schema, &json!(3), &mut |ctx| {
    ///     seen.push((ctx.schema_location.to_string(), ctx.result));
    /// });
    /// assert!(!valid);
    /// assert_eq!(
    ///     seen,
    ///     vec![
    ///         ("/minLength".to_string(), NodeEvaluationResult::Ignored),
    ///         ("/minimum".to_string(), NodeEvaluationResult::Invalid),
    ///     ]
    /// );
    /// ```
    pub fn trace(&self, schema: &Value, instance: &Value, callback: TracingCallback<'_>) -> bool {
        run_errors(
            self.environment(),
            schema,
            instance,
            self.max_errors,
            Some(callback),
        )
        .0
    }

    /// Compile `schema` into a reusable [`Program`].
    #[must_use]
    pub fn compile(&self, schema: &Value) -> Program {
        run_compile(self.environment(), schema)
    }
}

/// Options with no definitions or extensions registered.
#[must_use]
pub fn options() -> ValidationOptions {
    ValidationOptions::default()
}

/// Validate `instance` against `schema`, stopping at the first violation.
#[must_use]
pub fn check(definitions: &Definitions, schema: &Value, instance: &Value) -> bool {
    let registry = Registry::default();
    run_check(
        Environment {
            definitions,
            registry: &registry,
        },
        schema,
        instance,
    )
}

/// Validate `instance` against `schema` and collect up to 64 violations.
#[must_use]
pub fn errors<'i>(
    definitions: &Definitions,
    schema: &Value,
    instance: &'i Value,
) -> (bool, Vec<ValidationError<'i>>) {
    let registry = Registry::default();
    run_errors(
        Environment {
            definitions,
            registry: &registry,
        },
        schema,
        instance,
        DEFAULT_MAX_ERRORS,
        None,
    )
}

/// Compile `schema` into a reusable [`Program`].
#[must_use]
pub fn compile(definitions: &Definitions, schema: &Value) -> Program {
    let registry = Registry::default();
    run_compile(
        Environment {
            definitions,
            registry: &registry,
        },
        schema,
    )
}

fn run_check(env: Environment<'_>, schema: &Value, instance: &Value) -> bool {
    let tracking = schema::requires_tracking(schema, env.definitions);
    let mut stack = Stack::new(schema, env);
    schema::check(
        &mut stack,
        &mut EvaluationContext::new(tracking),
        schema,
        instance,
    )
}

fn run_errors<'i>(
    env: Environment<'_>,
    schema: &Value,
    instance: &'i Value,
    max_errors: usize,
    tracer: Option<TracingCallback<'_>>,
) -> (bool, Vec<ValidationError<'i>>) {
    let tracking = schema::requires_tracking(schema, env.definitions);
    let mut stack = Stack::new(schema, env);
    if let Some(tracer) = tracer {
        stack = stack.with_tracer(tracer);
    }
    let mut ctx = ErrorContext::new(tracking);
    let valid = schema::error(
        &mut stack,
        &mut ctx,
        &Location::new(),
        &LazyLocation::new(),
        schema,
        instance,
    );
    let mut errors = ctx.into_errors();
    errors.truncate(max_errors);
    (valid, errors)
}

fn run_compile(env: Environment<'_>, schema: &Value) -> Program {
    let tracking = schema::requires_tracking(schema, env.definitions);
    BuildSession::new(schema, env, tracking).finish(schema)
}


#[cfg(test)]
mod tests {
    use crate::{Definitions, NodeEvaluationResult};
    use serde_json::json;

    #[test]
    fn max_errors_bounds_the_list() {
        let schema = json!({"items": {"type": "string"}});
        let instance = json!([1, 2, 3, 4]);
        let (valid, errors) = crate::options().with_max_errors(2).errors(&schema, &instance);
        assert!(!valid);
        assert_eq!(errors.len(), 2);
        let (_, errors) = crate::errors(&Definitions::new(), &schema, &instance);
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn definitions_are_shared_by_strategies() {
        let options = crate::options().with_definitions([
            ("Name", json!({"type": "string"})),
            ("Names", json!({"type": "array", "items": {"$ref": "Name"}})),
        ]);
        let schema = json!({"$ref": "Names"});
        for (instance, expected) in [(json!(["a", "b"]), true), (json!(["a", 1]), false)] {
            assert_eq!(options.check(&schema, &instance), expected);
            assert_eq!(options.errors(&schema, &instance).0, expected);
            assert_eq!(options.compile(&schema).is_valid(&instance), expected);
        }
    }

    #[test]
    fn trace_reports_nested_keywords() {
        let schema = json!({"properties": {"a": {"type": "integer"}}});
        let mut events = Vec::new();
        let valid = crate::options().trace(&schema, &json!({"a": "x"}), &mut |ctx| {
            events.push((
                ctx.keyword,
                ctx.schema_location.to_string(),
                crate::Location::from(ctx.instance_location).to_string(),
                ctx.result,
            ));
        });
        assert!(!valid);
        assert_eq!(
            events,
            vec![
                (
                    "type",
                    "/properties/a/type".to_string(),
                    "/a".to_string(),
                    NodeEvaluationResult::Invalid
                ),
                (
                    "properties",
                    "/properties".to_string(),
                    String::new(),
                    NodeEvaluationResult::Invalid
                ),
            ]
        );
    }

    #[test]
    fn trace_agrees_with_check() {
        let schema = json!({"anyOf": [{"type": "string"}, {"minimum": 2}]});
        for instance in [json!("a"), json!(3), json!(1), json!(null)] {
            let traced = crate::options().trace(&schema, &instance, &mut |_| {});
            assert_eq!(traced, crate::options().check(&schema, &instance));
        }
    }

    #[test]
    fn options_debug_lists_registrations() {
        let options = crate::options()
            .with_definition("A", json!(true))
            .with_refinement("even", |value: &serde_json::Value| value.is_number());
        let debug = format!("{options:?}");
        assert!(debug.contains("\"A\""));
        assert!(debug.contains("\"even\""));
        assert!(debug.contains("max_errors: 64"));
    }
}
