//! Evaluated-location bookkeeping threaded through a validation call.
//!
//! A context records which object keys and array indices of the current instance some keyword
//! has already matched against a subschema, so `unevaluatedProperties` / `unevaluatedItems` can
//! skip them. Composition branches work on forks that are merged back only when the branch is
//! visible to the enclosing scope.
use ahash::AHashSet;

use crate::error::ValidationError;

/// Operations shared by the boolean and the error-collecting contexts.
pub(crate) trait Context<'i>: Sized {
    /// A fresh, empty context with the same tracking mode.
    fn fork(&self) -> Self;
    /// Union the evaluated locations of `other` into `self`.
    fn merge(&mut self, other: Self);
    fn tracking(&self) -> bool;
    fn add_key(&mut self, key: &'i str);
    fn add_index(&mut self, index: usize);
    fn is_evaluated_key(&self, key: &str) -> bool;
    fn is_evaluated_index(&self, index: usize) -> bool;
}

#[derive(Debug, Default)]
pub(crate) struct EvaluationContext<'i> {
    keys: AHashSet<&'i str>,
    indices: AHashSet<usize>,
    tracking: bool,
}

impl<'i> EvaluationContext<'i> {
    pub(crate) fn new(tracking: bool) -> EvaluationContext<'i> {
        EvaluationContext {
            keys: AHashSet::new(),
            indices: AHashSet::new(),
            tracking,
        }
    }
}

impl<'i> Context<'i> for EvaluationContext<'i> {
    fn fork(&self) -> Self {
        EvaluationContext::new(self.tracking)
    }

    fn merge(&mut self, other: Self) {
        if self.tracking {
            self.keys.extend(other.keys);
            self.indices.extend(other.indices);
        }
    }

    #[inline]
    fn tracking(&self) -> bool {
        self.tracking
    }

    #[inline]
    fn add_key(&mut self, key: &'i str) {
        if self.tracking {
            self.keys.insert(key);
        }
    }

    #[inline]
    fn add_index(&mut self, index: usize) {
        if self.tracking {
            self.indices.insert(index);
        }
    }

    fn is_evaluated_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    fn is_evaluated_index(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }
}

/// Context of the error-collecting strategy.
///
/// Errors are never carried over by [`Context::merge`]; keywords decide explicitly which branch
/// errors surface through [`ErrorContext::append_errors`].
#[derive(Debug, Default)]
pub(crate) struct ErrorContext<'i> {
    evaluated: EvaluationContext<'i>,
    errors: Vec<ValidationError<'i>>,
}

impl<'i> ErrorContext<'i> {
    pub(crate) fn new(tracking: bool) -> ErrorContext<'i> {
        ErrorContext {
            evaluated: EvaluationContext::new(tracking),
            errors: Vec::new(),
        }
    }

    /// Record a violation. Always returns `false` so callers can return it as their verdict.
    pub(crate) fn add_error(&mut self, error: ValidationError<'i>) -> bool {
        self.errors.push(error);
        false
    }

    /// Move the errors collected in `other` to the end of this context's list.
    pub(crate) fn append_errors(&mut self, other: ErrorContext<'i>) {
        self.errors.extend(other.errors);
    }

    pub(crate) fn extend_errors(&mut self, errors: impl IntoIterator<Item = ValidationError<'i>>) {
        self.errors.extend(errors);
    }

    pub(crate) fn into_errors(self) -> Vec<ValidationError<'i>> {
        self.errors
    }
}

impl<'i> Context<'i> for ErrorContext<'i> {
    fn fork(&self) -> Self {
        ErrorContext::new(self.evaluated.tracking)
    }

    fn merge(&mut self, other: Self) {
        self.evaluated.merge(other.evaluated);
    }

    #[inline]
    fn tracking(&self) -> bool {
        self.evaluated.tracking
    }

    #[inline]
    fn add_key(&mut self, key: &'i str) {
        self.evaluated.add_key(key);
    }

    #[inline]
    fn add_index(&mut self, index: usize) {
        self.evaluated.add_index(index);
    }

    fn is_evaluated_key(&self, key: &str) -> bool {
        self.evaluated.is_evaluated_key(key)
    }

    fn is_evaluated_index(&self, index: usize) -> bool {
        self.evaluated.is_evaluated_index(index)
    }
}
