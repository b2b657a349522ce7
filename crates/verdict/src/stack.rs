//! Descent state shared by every strategy: lexical scopes, registries and compiled patterns.
use std::sync::Arc;

use ahash::AHashMap;
use referencing::{Resolved, ScopeStack};
use serde_json::Value;

use crate::{
    externals::{Refine, StandardValidator},
    paths::{LazyLocation, Location},
    regex::{Pattern, PatternError},
    tracing::{NodeEvaluationResult, TracingCallback, TracingContext},
    Definitions,
};

/// Registered `~refine` predicates and `~standard` validators.
#[derive(Clone, Default)]
pub(crate) struct Registry {
    pub(crate) refinements: AHashMap<String, Arc<dyn Refine>>,
    pub(crate) standards: AHashMap<String, Arc<dyn StandardValidator>>,
}

/// Everything a validation call may consult besides the schema itself.
#[derive(Clone, Copy)]
pub(crate) struct Environment<'s> {
    pub(crate) definitions: &'s Definitions,
    pub(crate) registry: &'s Registry,
}

pub(crate) struct Stack<'s, 't> {
    scopes: ScopeStack<'s>,
    env: Environment<'s>,
    tracer: Option<TracingCallback<'t>>,
    patterns: AHashMap<&'s str, Result<Arc<Pattern>, PatternError>>,
}

impl<'s, 't> Stack<'s, 't> {
    pub(crate) fn new(root: &'s Value, env: Environment<'s>) -> Stack<'s, 't> {
        Stack {
            scopes: ScopeStack::new(root),
            env,
            tracer: None,
            patterns: AHashMap::new(),
        }
    }

    pub(crate) fn with_tracer(mut self, tracer: TracingCallback<'t>) -> Stack<'s, 't> {
        self.tracer = Some(tracer);
        self
    }

    #[inline]
    pub(crate) fn push(&mut self, node: &'s Value) {
        self.scopes.push(node);
    }

    #[inline]
    pub(crate) fn pop(&mut self, node: &'s Value) {
        self.scopes.pop(node);
    }

    pub(crate) fn enter(&mut self, resolved: &Resolved<'s>) {
        self.scopes.enter(resolved);
    }

    pub(crate) fn leave(&mut self) {
        self.scopes.leave();
    }

    pub(crate) fn scopes(&self) -> &ScopeStack<'s> {
        &self.scopes
    }

    /// Resolve `$ref`.
    ///
    /// Named definitions win by exact name, then the current lexical scope, then the root
    /// document and every definition document in order.
    pub(crate) fn resolve_ref(&self, reference: &str) -> Result<Resolved<'s>, referencing::Error> {
        if let Some(definition) = self.env.definitions.get(reference) {
            return Ok(Resolved::document_root(definition));
        }
        let error = match self.scopes.resolve(reference) {
            Ok(resolved) => return Ok(resolved),
            Err(error) => error,
        };
        let current = self.scopes.document();
        std::iter::once(self.scopes.root())
            .chain(self.env.definitions.values())
            .filter(|document| !std::ptr::eq(*document, current))
            .find_map(|document| self.scopes.resolve_in(document, reference).ok())
            .ok_or(error)
    }

    pub(crate) fn resolve_recursive(
        &self,
        reference: &str,
    ) -> Result<Resolved<'s>, referencing::Error> {
        self.scopes.resolve_recursive(reference)
    }

    pub(crate) fn resolve_dynamic(
        &self,
        reference: &str,
    ) -> Result<Resolved<'s>, referencing::Error> {
        self.scopes.resolve_dynamic(reference)
    }

    pub(crate) fn refinement(&self, name: &str) -> Option<&Arc<dyn Refine>> {
        self.env.registry.refinements.get(name)
    }

    pub(crate) fn standard(&self, name: &str) -> Option<&Arc<dyn StandardValidator>> {
        self.env.registry.standards.get(name)
    }

    /// Compile `source` once per validation call.
    pub(crate) fn pattern(&mut self, source: &'s str) -> Result<Arc<Pattern>, PatternError> {
        self.patterns
            .entry(source)
            .or_insert_with(|| Pattern::new(source).map(Arc::new))
            .clone()
    }

    #[inline]
    pub(crate) fn is_tracing(&self) -> bool {
        self.tracer.is_some()
    }

    pub(crate) fn trace(
        &mut self,
        instance_location: &LazyLocation<'_, '_>,
        schema_location: &Location,
        keyword: &'static str,
        result: impl Into<NodeEvaluationResult>,
    ) {
        if let Some(tracer) = self.tracer.as_mut() {
            TracingContext::new(instance_location, schema_location, keyword, result)
                .call(&mut **tracer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Environment, Registry, Stack};
    use crate::Definitions;
    use serde_json::json;

    #[test]
    fn named_definitions_win() {
        let root = json!({"$defs": {"Name": {"type": "integer"}}});
        let mut definitions = Definitions::new();
        definitions.insert("Name".into(), json!({"type": "string"}));
        let registry = Registry::default();
        let stack = Stack::new(
            &root,
            Environment {
                definitions: &definitions,
                registry: &registry,
            },
        );
        let resolved = stack.resolve_ref("Name").expect("Resolvable");
        assert_eq!(resolved.contents(), &json!({"type": "string"}));
    }

    #[test]
    fn definition_documents_are_searched() {
        let root = json!({});
        let mut definitions = Definitions::new();
        definitions.insert(
            "Point".into(),
            json!({"$id": "http://example.com/point.json", "type": "object"}),
        );
        let registry = Registry::default();
        let stack = Stack::new(
            &root,
            Environment {
                definitions: &definitions,
                registry: &registry,
            },
        );
        let resolved = stack
            .resolve_ref("http://example.com/point.json")
            .expect("Resolvable");
        assert_eq!(resolved.contents()["type"], json!("object"));
        assert!(stack.resolve_ref("#/missing").is_err());
    }

    #[test]
    fn patterns_are_cached() {
        let root = json!({});
        let definitions = Definitions::new();
        let registry = Registry::default();
        let mut stack = Stack::new(
            &root,
            Environment {
                definitions: &definitions,
                registry: &registry,
            },
        );
        let first = stack.pattern("^a+$").expect("Valid pattern");
        let second = stack.pattern("^a+$").expect("Valid pattern");
        assert!(std::sync::Arc::ptr_eq(&first, &second));
        assert!(stack.pattern("(").is_err());
    }
}
