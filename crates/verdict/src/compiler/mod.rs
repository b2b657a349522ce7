//! The compiled strategy.
//!
//! Building lowers a schema into a [`Program`]: one subroutine for the root and one for every
//! distinct reference target, each an [`Expr`] tree. Subroutines are memoized by the target's
//! structural hash and lexical scope, so a self-referential schema compiles into recursive
//! subroutine calls instead of an unbounded expansion.
mod expr;

use core::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use referencing::Resolved;
use serde_json::Value;

pub(crate) use expr::Expr;

use crate::{
    context::EvaluationContext,
    ext::hash::hash_scoped,
    externals::{External, Externals, Hoisted, Refine, StandardValidator},
    regex::{Pattern, PatternError},
    schema,
    stack::{Environment, Stack},
};

/// Index of a subroutine within a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SubroutineId(usize);

impl fmt::Display for SubroutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "check_{}", self.0)
    }
}

/// Everything a cached subroutine depends on besides its hash.
struct CacheEntry<'s> {
    node: &'s Value,
    document: &'s Value,
    base: String,
    recursive_base: Option<String>,
    id: SubroutineId,
}

/// State owned by a single build.
///
/// Nothing here outlives the build or is shared with another one, so concurrent builds are
/// independent.
pub(crate) struct BuildSession<'s> {
    pub(crate) stack: Stack<'s, 'static>,
    tracking: bool,
    externals: Externals,
    cache: AHashMap<u64, Vec<CacheEntry<'s>>>,
    subroutines: Vec<Option<Expr>>,
    patterns: AHashMap<&'s str, Hoisted<Pattern>>,
    refinements: AHashMap<&'s str, Hoisted<dyn Refine>>,
    standards: AHashMap<&'s str, Hoisted<dyn StandardValidator>>,
}

impl<'s> BuildSession<'s> {
    pub(crate) fn new(root: &'s Value, env: Environment<'s>, tracking: bool) -> BuildSession<'s> {
        BuildSession {
            stack: Stack::new(root, env),
            tracking,
            externals: Externals::new(),
            cache: AHashMap::new(),
            subroutines: Vec::new(),
            patterns: AHashMap::new(),
            refinements: AHashMap::new(),
            standards: AHashMap::new(),
        }
    }

    /// Whether compiled expressions record evaluated locations.
    #[inline]
    pub(crate) fn tracking(&self) -> bool {
        self.tracking
    }

    /// Compile `source` and hoist it; every source is hoisted once.
    pub(crate) fn pattern(&mut self, source: &'s str) -> Result<Hoisted<Pattern>, PatternError> {
        if let Some(hoisted) = self.patterns.get(source) {
            return Ok(hoisted.clone());
        }
        let pattern = self.stack.pattern(source)?;
        let hoisted = Hoisted {
            index: self.externals.push(External::Pattern(Arc::clone(&pattern))),
            value: pattern,
        };
        self.patterns.insert(source, hoisted.clone());
        Ok(hoisted)
    }

    pub(crate) fn refinement(&mut self, name: &'s str) -> Option<Hoisted<dyn Refine>> {
        if let Some(hoisted) = self.refinements.get(name) {
            return Some(hoisted.clone());
        }
        let refinement = Arc::clone(self.stack.refinement(name)?);
        let hoisted = Hoisted {
            index: self
                .externals
                .push(External::Refinement(Arc::clone(&refinement))),
            value: refinement,
        };
        self.refinements.insert(name, hoisted.clone());
        Some(hoisted)
    }

    pub(crate) fn standard(&mut self, name: &'s str) -> Option<Hoisted<dyn StandardValidator>> {
        if let Some(hoisted) = self.standards.get(name) {
            return Some(hoisted.clone());
        }
        let validator = Arc::clone(self.stack.standard(name)?);
        let hoisted = Hoisted {
            index: self.externals.push(External::Standard(Arc::clone(&validator))),
            value: validator,
        };
        self.standards.insert(name, hoisted.clone());
        Some(hoisted)
    }

    /// The subroutine validating a reference target inside its own lexical scope.
    pub(crate) fn subroutine(&mut self, resolved: &Resolved<'s>) -> SubroutineId {
        self.stack.enter(resolved);
        let id = self.define(resolved.contents());
        self.stack.leave();
        id
    }

    /// Find or build the subroutine for `node` in the current scope.
    ///
    /// The id is reserved before the body is built, so references back to `node` from inside
    /// its own body become recursive calls.
    fn define(&mut self, node: &'s Value) -> SubroutineId {
        let scopes = self.stack.scopes();
        let document = scopes.document();
        let base = scopes.base_uri().as_str().to_string();
        let recursive_base = scopes
            .outermost_recursive_base()
            .map(|url| url.as_str().to_string());
        let hash = hash_scoped(
            node,
            &[&base, recursive_base.as_deref().unwrap_or_default()],
        );
        if let Some(entry) = self.cache.get(&hash).and_then(|entries| {
            entries.iter().find(|entry| {
                std::ptr::eq(entry.document, document)
                    && entry.base == base
                    && entry.recursive_base == recursive_base
                    && entry.node == node
            })
        }) {
            return entry.id;
        }
        let id = SubroutineId(self.subroutines.len());
        self.subroutines.push(None);
        self.cache.entry(hash).or_default().push(CacheEntry {
            node,
            document,
            base,
            recursive_base,
            id,
        });
        let body = schema::build(self, node);
        self.subroutines[id.0] = Some(body);
        id
    }

    /// Compile `root` into a [`Program`].
    pub(crate) fn finish(mut self, root: &'s Value) -> Program {
        let entry = self.define(root);
        Program {
            entry,
            subroutines: self
                .subroutines
                .into_iter()
                .map(|body| body.unwrap_or(Expr::False))
                .collect(),
            externals: self.externals,
            tracking: self.tracking,
        }
    }
}

/// A compiled validator.
///
/// ```rust
/// use serde_json::json;
///
/// let schema = json!({"type": "array", "items": {"type": "integer", "minimum": 0}});
/// let program = verdict::options().compile(&schema);
/// assert!(program.is_valid(&json!([1, 2, 3])));
/// assert!(!program.is_valid(&json!([1, -2])));
/// assert_eq!(program.call_expression(), "check_0(value)");
/// ```
pub struct Program {
    entry: SubroutineId,
    subroutines: Vec<Expr>,
    externals: Externals,
    tracking: bool,
}

impl Program {
    /// Validate `instance`.
    #[must_use]
    pub fn is_valid(&self, instance: &Value) -> bool {
        let mut ctx = EvaluationContext::new(self.tracking);
        self.call(self.entry, &mut ctx, instance)
    }

    #[inline]
    pub(crate) fn call<'i>(
        &self,
        id: SubroutineId,
        ctx: &mut EvaluationContext<'i>,
        instance: &'i Value,
    ) -> bool {
        self.subroutines
            .get(id.0)
            .is_some_and(|body| body.eval(self, ctx, instance))
    }

    /// Rendered pseudo-source of every subroutine.
    #[must_use]
    pub fn source(&self) -> String {
        self.to_string()
    }

    /// Values the rendered source refers to by index.
    #[must_use]
    pub fn externals(&self) -> &Externals {
        &self.externals
    }

    /// Expression invoking the entry subroutine on `value`.
    #[must_use]
    pub fn call_expression(&self) -> String {
        format!("{}(value)", self.entry)
    }

    /// Whether evaluation records evaluated keys and indices for the unevaluated keywords.
    #[must_use]
    pub fn uses_unevaluated_tracking(&self) -> bool {
        self.tracking
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, body) in self.subroutines.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            writeln!(f, "function {}(value) {{", SubroutineId(idx))?;
            writeln!(
                f,
                "  return {};",
                body.render(self.externals.identifier(), 0)
            )?;
            f.write_str("}\n")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("entry", &self.entry)
            .field("externals", &self.externals)
            .field("tracking", &self.tracking)
            .finish_non_exhaustive()?;
        f.write_str("\n")?;
        fmt::Display::fmt(self, f)
    }
}
