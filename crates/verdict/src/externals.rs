//! Host-supplied predicates and the side table that compiled programs refer to them through.
use core::fmt;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use serde_json::Value;

use crate::regex::Pattern;

/// A named predicate referenced from `~refine` entries.
///
/// ```rust
/// use serde_json::json;
///
/// let options = verdict::options()
///     .with_refinement("even", |value: &serde_json::Value| {
///         value.as_u64().is_some_and(|n| n % 2 == 0)
///     });
/// let schema = json!({"~refine": [{"refine": "even", "message": "must be even"}]});
/// assert!(options.check(&schema, &json!(4)));
/// assert!(!options.check(&schema, &json!(3)));
/// ```
pub trait Refine: Send + Sync {
    fn refine(&self, value: &Value) -> bool;
}

impl<F> Refine for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn refine(&self, value: &Value) -> bool {
        self(value)
    }
}

/// A problem reported by a [`StandardValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardIssue {
    pub message: String,
}

impl StandardIssue {
    pub fn new(message: impl Into<String>) -> StandardIssue {
        StandardIssue {
            message: message.into(),
        }
    }
}

/// A validator from another schema library, referenced from `~standard` by name.
pub trait StandardValidator: Send + Sync {
    /// # Errors
    ///
    /// Every issue found in `value`.
    fn validate(&self, value: &Value) -> Result<(), Vec<StandardIssue>>;
}

impl<F> StandardValidator for F
where
    F: Fn(&Value) -> Result<(), Vec<StandardIssue>> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<(), Vec<StandardIssue>> {
        self(value)
    }
}

/// A runtime value a compiled program refers to by index.
#[derive(Clone)]
pub enum External {
    Pattern(Arc<Pattern>),
    Refinement(Arc<dyn Refine>),
    Standard(Arc<dyn StandardValidator>),
}

impl fmt::Debug for External {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            External::Pattern(pattern) => write!(f, "Pattern({pattern:?})"),
            External::Refinement(_) => f.write_str("Refinement"),
            External::Standard(_) => f.write_str("Standard"),
        }
    }
}

static IDENTIFIERS: AtomicUsize = AtomicUsize::new(0);

/// Indexed side table of the values hoisted out of a compiled program.
///
/// Every build owns a fresh table with a process-unique identifier.
#[derive(Debug, Clone)]
pub struct Externals {
    identifier: String,
    variables: Vec<External>,
}

impl Externals {
    pub(crate) fn new() -> Externals {
        let id = IDENTIFIERS.fetch_add(1, Ordering::Relaxed);
        Externals {
            identifier: format!("external_{id}"),
            variables: Vec::new(),
        }
    }

    /// Name the rendered program uses for this table.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn variables(&self) -> &[External] {
        &self.variables
    }

    pub(crate) fn push(&mut self, external: External) -> usize {
        self.variables.push(external);
        self.variables.len() - 1
    }
}

/// A value hoisted into [`Externals`], together with its slot.
pub(crate) struct Hoisted<T: ?Sized> {
    pub(crate) index: usize,
    pub(crate) value: Arc<T>,
}

impl<T: ?Sized> Clone for Hoisted<T> {
    fn clone(&self) -> Self {
        Hoisted {
            index: self.index,
            value: Arc::clone(&self.value),
        }
    }
}

impl<T: ?Sized> AsRef<T> for Hoisted<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::{External, Externals, Refine, StandardIssue, StandardValidator};
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[test]
    fn identifiers_are_unique() {
        let first = Externals::new();
        let second = Externals::new();
        assert_ne!(first.identifier(), second.identifier());
        assert!(first.identifier().starts_with("external_"));
    }

    #[test]
    fn push_returns_slot() {
        let mut externals = Externals::new();
        let refine: Arc<dyn Refine> = Arc::new(|value: &Value| value.is_string());
        assert_eq!(externals.push(External::Refinement(Arc::clone(&refine))), 0);
        assert_eq!(externals.push(External::Refinement(refine)), 1);
        assert_eq!(externals.variables().len(), 2);
    }

    #[test]
    fn closures_implement_traits() {
        let refine = |value: &Value| value.as_i64() == Some(1);
        assert!(refine.refine(&json!(1)));
        let standard = |value: &Value| {
            if value.is_null() {
                Err(vec![StandardIssue::new("null")])
            } else {
                Ok(())
            }
        };
        assert_eq!(
            standard.validate(&json!(null)),
            Err(vec![StandardIssue::new("null")])
        );
        assert_eq!(standard.validate(&json!(0)), Ok(()));
    }
}
