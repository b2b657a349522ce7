//! Per-keyword evaluation callbacks.
use crate::paths::{LazyLocation, Location};

/// A single keyword evaluation reported to a [`TracingCallback`].
#[derive(Debug, Clone)]
pub struct TracingContext<'a, 'b, 'c> {
    /// Location of the evaluated value.
    pub instance_location: &'c LazyLocation<'a, 'b>,
    /// Location of the keyword within the schema.
    pub schema_location: &'c Location,
    /// Name of the evaluated keyword.
    pub keyword: &'static str,
    pub result: NodeEvaluationResult,
}

impl<'a, 'b, 'c> TracingContext<'a, 'b, 'c> {
    pub(crate) fn new(
        instance_location: &'c LazyLocation<'a, 'b>,
        schema_location: &'c Location,
        keyword: &'static str,
        result: impl Into<NodeEvaluationResult>,
    ) -> Self {
        Self {
            instance_location,
            schema_location,
            keyword,
            result: result.into(),
        }
    }

    pub(crate) fn call(self, callback: &mut dyn FnMut(TracingContext)) {
        callback(self);
    }
}

/// Outcome of a keyword evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvaluationResult {
    Valid,
    Invalid,
    /// The keyword does not apply to the value's runtime category.
    Ignored,
}

impl From<bool> for NodeEvaluationResult {
    fn from(value: bool) -> Self {
        if value {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

impl From<Option<bool>> for NodeEvaluationResult {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Ignored, Self::from)
    }
}

/// Callback invoked once per evaluated keyword.
pub type TracingCallback<'a> = &'a mut dyn FnMut(TracingContext);
