//! Lexical scope tracking during schema descent.
use serde_json::{Map, Value};
use url::Url;

use crate::{resolver, uri, Error, Resolved};

#[derive(Debug, Clone)]
struct Scope<'s> {
    /// Node that established this scope.
    node: &'s Value,
    /// Base URI in effect inside `node`.
    base: Url,
    /// Document `node` belongs to.
    document: &'s Value,
}

/// Stack of identifier-affecting nodes enclosing the current descent position.
///
/// Every `push` must be paired with a `pop` of the same node once the descent into it finishes.
#[derive(Debug, Clone)]
pub struct ScopeStack<'s> {
    root: &'s Value,
    root_base: Url,
    ids: Vec<Scope<'s>>,
    anchors: Vec<&'s str>,
    recursive_anchors: Vec<Scope<'s>>,
    dynamic_anchors: Vec<&'s str>,
}

impl<'s> ScopeStack<'s> {
    /// Create a stack for descending into `root`.
    #[must_use]
    pub fn new(root: &'s Value) -> ScopeStack<'s> {
        ScopeStack {
            root,
            root_base: uri::root(),
            ids: Vec::new(),
            anchors: Vec::new(),
            recursive_anchors: Vec::new(),
            dynamic_anchors: Vec::new(),
        }
    }

    /// The document validation started from.
    #[must_use]
    pub fn root(&self) -> &'s Value {
        self.root
    }

    /// Enter a schema node.
    pub fn push(&mut self, node: &'s Value) {
        let Value::Object(map) = node else {
            return;
        };
        if let Some(Value::String(id)) = map.get("$id") {
            let base = uri::resolve_against(self.base_uri(), id)
                .unwrap_or_else(|_| self.base_uri().clone());
            let document = self.document();
            self.ids.push(Scope {
                node,
                base,
                document,
            });
        }
        if let Some(Value::String(anchor)) = map.get("$anchor") {
            self.anchors.push(anchor);
        }
        if has_recursive_anchor(map) {
            let scope = Scope {
                node,
                base: self.base_uri().clone(),
                document: self.document(),
            };
            self.recursive_anchors.push(scope);
        }
        if let Some(Value::String(anchor)) = map.get("$dynamicAnchor") {
            self.dynamic_anchors.push(anchor);
        }
    }

    /// Leave a schema node previously passed to [`ScopeStack::push`].
    pub fn pop(&mut self, node: &'s Value) {
        let Value::Object(map) = node else {
            return;
        };
        if matches!(map.get("$dynamicAnchor"), Some(Value::String(_))) {
            self.dynamic_anchors.pop();
        }
        if has_recursive_anchor(map) {
            self.recursive_anchors.pop();
        }
        if matches!(map.get("$anchor"), Some(Value::String(_))) {
            self.anchors.pop();
        }
        if matches!(map.get("$id"), Some(Value::String(_))) {
            self.ids.pop();
        }
    }

    /// Enter the lexical scope that encloses a resolved reference target.
    ///
    /// Must be paired with [`ScopeStack::leave`].
    pub fn enter(&mut self, resolved: &Resolved<'s>) {
        self.ids.push(Scope {
            node: resolved.resource(),
            base: resolved.base().clone(),
            document: resolved.document(),
        });
    }

    /// Leave the scope entered with [`ScopeStack::enter`].
    pub fn leave(&mut self) {
        self.ids.pop();
    }

    /// Current base URI.
    #[must_use]
    pub fn base_uri(&self) -> &Url {
        self.ids.last().map_or(&self.root_base, |scope| &scope.base)
    }

    /// The innermost node that established the current base URI.
    #[must_use]
    pub fn base(&self) -> &'s Value {
        self.ids.last().map_or(self.root, |scope| scope.node)
    }

    /// Document that lexically contains the current position.
    #[must_use]
    pub fn document(&self) -> &'s Value {
        self.ids.last().map_or(self.root, |scope| scope.document)
    }

    /// Anchors declared by enclosing nodes, innermost last.
    #[must_use]
    pub fn anchors(&self) -> &[&'s str] {
        &self.anchors
    }

    /// Dynamic anchors declared by enclosing nodes, innermost last.
    #[must_use]
    pub fn dynamic_anchors(&self) -> &[&'s str] {
        &self.dynamic_anchors
    }

    /// Base URI used for `$recursiveRef` resolution.
    ///
    /// If the current base node sets `$recursiveAnchor: true`, this is the base of the outermost
    /// such node on the stack; otherwise it is the current base URI.
    #[must_use]
    pub fn recursive_base_uri(&self) -> &Url {
        match (self.base(), self.recursive_anchors.first()) {
            (Value::Object(base), Some(outermost)) if has_recursive_anchor(base) => {
                &outermost.base
            }
            _ => self.base_uri(),
        }
    }

    /// Base URI of the outermost node on the stack that sets `$recursiveAnchor: true`.
    #[must_use]
    pub fn outermost_recursive_base(&self) -> Option<&Url> {
        self.recursive_anchors.first().map(|scope| &scope.base)
    }

    fn recursive_document(&self) -> &'s Value {
        match (self.base(), self.recursive_anchors.first()) {
            (Value::Object(base), Some(outermost)) if has_recursive_anchor(base) => {
                outermost.document
            }
            _ => self.document(),
        }
    }

    /// Resolve `$ref` against the current lexical scope.
    ///
    /// # Errors
    ///
    /// If the reference is invalid or does not match any node.
    pub fn resolve(&self, reference: &str) -> Result<Resolved<'s>, Error> {
        resolver::lookup(self.document(), self.base_uri(), reference)
    }

    /// Resolve `$ref` in an arbitrary document, keeping the current base URI.
    ///
    /// # Errors
    ///
    /// If the reference is invalid or does not match any node.
    pub fn resolve_in(&self, document: &'s Value, reference: &str) -> Result<Resolved<'s>, Error> {
        resolver::lookup(document, self.base_uri(), reference)
    }

    /// Resolve `$recursiveRef`.
    ///
    /// # Errors
    ///
    /// If the reference is invalid or does not match any node.
    pub fn resolve_recursive(&self, reference: &str) -> Result<Resolved<'s>, Error> {
        resolver::lookup(
            self.recursive_document(),
            self.recursive_base_uri(),
            reference,
        )
    }

    /// Resolve `$dynamicRef`.
    ///
    /// Dynamic scoping is not implemented, this always fails.
    ///
    /// # Errors
    ///
    /// Always.
    pub fn resolve_dynamic(&self, reference: &str) -> Result<Resolved<'s>, Error> {
        Err(Error::dynamic_reference(reference))
    }
}

fn has_recursive_anchor(map: &Map<String, Value>) -> bool {
    matches!(map.get("$recursiveAnchor"), Some(Value::Bool(true)))
}
