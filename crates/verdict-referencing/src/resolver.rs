use serde_json::{Map, Value};
use url::Url;

use crate::{pointer::unescape_segment, uri, Error};

/// Keywords whose values are instance data rather than subschemas.
const DATA_KEYWORDS: [&str; 4] = ["const", "default", "enum", "examples"];

/// A schema node located by reference resolution.
#[derive(Debug, Clone)]
pub struct Resolved<'s> {
    contents: &'s Value,
    base: Url,
    resource: &'s Value,
    document: &'s Value,
}

impl<'s> Resolved<'s> {
    /// The root of a standalone document, resolved under the synthetic root base.
    #[must_use]
    pub fn document_root(document: &'s Value) -> Resolved<'s> {
        Resolved {
            contents: document,
            base: uri::root(),
            resource: document,
            document,
        }
    }
    /// The resolved schema node.
    #[must_use]
    pub fn contents(&self) -> &'s Value {
        self.contents
    }
    /// Base URI that lexically encloses the resolved node, before its own `$id` applies.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }
    /// The innermost node declaring `$id` that encloses the resolved node, or the document root.
    #[must_use]
    pub fn resource(&self) -> &'s Value {
        self.resource
    }
    /// Document the node was found in.
    #[must_use]
    pub fn document(&self) -> &'s Value {
        self.document
    }
}

/// Resolve a reference against the synthetic root base of `document`.
///
/// Returns the first node reachable by a depth-first walk that matches the reference.
#[must_use]
pub fn resolve<'s>(document: &'s Value, reference: &str) -> Option<&'s Value> {
    lookup(document, &uri::root(), reference)
        .ok()
        .map(|resolved| resolved.contents)
}

/// Resolve a reference that appears in a scope whose base URI is `base`.
///
/// # Errors
///
/// If the reference is not a valid URI reference or nothing in `document` matches it.
pub fn lookup<'s>(document: &'s Value, base: &Url, reference: &str) -> Result<Resolved<'s>, Error> {
    let target = uri::resolve_against(base, reference)?;
    let mut search = Search {
        reference,
        fragment: uri::fragment(&target).map(std::borrow::Cow::into_owned),
        target,
        document,
        miss: None,
    };
    let root = uri::root();
    match search.walk(document, &root, document) {
        Some(resolved) => Ok(resolved),
        None => Err(search
            .miss
            .unwrap_or_else(|| Error::unresolvable(search.target.as_str()))),
    }
}

struct Search<'r, 's> {
    reference: &'r str,
    target: Url,
    fragment: Option<String>,
    document: &'s Value,
    miss: Option<Error>,
}

impl<'s> Search<'_, 's> {
    fn walk(&mut self, node: &'s Value, base: &Url, resource: &'s Value) -> Option<Resolved<'s>> {
        match node {
            Value::Object(map) => {
                let (current, own_resource) = if let Some(Value::String(id)) = map.get("$id") {
                    if id == self.reference {
                        return Some(self.found(node, base, resource));
                    }
                    (
                        uri::resolve_against(base, id).unwrap_or_else(|_| base.clone()),
                        node,
                    )
                } else {
                    (base.clone(), resource)
                };
                if uri::same_resource(&current, &self.target) {
                    if let Some(found) = self.match_fragment(node, map, base, resource, &current) {
                        return Some(found);
                    }
                }
                for (key, child) in map {
                    if DATA_KEYWORDS.contains(&key.as_str()) {
                        continue;
                    }
                    if let Some(found) = self.walk(child, &current, own_resource) {
                        return Some(found);
                    }
                }
                None
            }
            Value::Array(items) => items
                .iter()
                .find_map(|child| self.walk(child, base, resource)),
            _ => None,
        }
    }

    fn match_fragment(
        &mut self,
        node: &'s Value,
        map: &'s Map<String, Value>,
        base: &Url,
        resource: &'s Value,
        current: &Url,
    ) -> Option<Resolved<'s>> {
        match self.fragment.as_deref() {
            None | Some("") => Some(self.found(node, base, resource)),
            Some(pointer) if pointer.starts_with('/') => {
                let resolved = self.follow(node, base, resource, pointer);
                if resolved.is_none() {
                    self.miss = Some(Error::pointer_to_nowhere(pointer));
                }
                resolved
            }
            Some(name) => {
                // Plain-name fragments declared through `$id: "#name"`
                let by_id = current.fragment().is_some_and(|own| own == name);
                let by_anchor = matches!(map.get("$anchor"), Some(Value::String(anchor)) if anchor == name);
                if by_id || by_anchor {
                    Some(self.found(node, base, resource))
                } else {
                    if self.miss.is_none() {
                        self.miss = Some(Error::no_such_anchor(name));
                    }
                    None
                }
            }
        }
    }

    fn follow(
        &self,
        node: &'s Value,
        base: &Url,
        resource: &'s Value,
        pointer: &str,
    ) -> Option<Resolved<'s>> {
        let mut enclosing = (base.clone(), resource);
        let mut target = node;
        for token in pointer.split('/').skip(1).map(unescape_segment) {
            let child = match target {
                Value::Object(map) => map.get(&*token)?,
                Value::Array(items) => items.get(crate::pointer::parse_index(&token)?)?,
                _ => return None,
            };
            enclosing = own_scope(target, enclosing);
            target = child;
        }
        Some(self.found(target, &enclosing.0, enclosing.1))
    }

    fn found(&self, contents: &'s Value, base: &Url, resource: &'s Value) -> Resolved<'s> {
        Resolved {
            contents,
            base: base.clone(),
            resource,
            document: self.document,
        }
    }
}

/// Scope that `node` establishes for its children.
fn own_scope<'s>(node: &'s Value, enclosing: (Url, &'s Value)) -> (Url, &'s Value) {
    if let Some(Value::String(id)) = node.get("$id") {
        match uri::resolve_against(&enclosing.0, id) {
            Ok(base) => (base, node),
            Err(_) => (enclosing.0, node),
        }
    } else {
        enclosing
    }
}

#[cfg(test)]
mod tests {
    use super::{lookup, resolve};
    use crate::{uri, Error};
    use serde_json::{json, Value};
    use test_case::test_case;
    use url::Url;

    fn document() -> Value {
        json!({
            "$id": "http://example.com/root.json",
            "$defs": {
                "a": {"type": "integer"},
                "b": {"$id": "other.json", "type": "string"},
                "c": {"$anchor": "named", "type": "boolean"},
                "d": {
                    "$id": "nested/",
                    "$defs": {
                        "e": {
                            "$id": "deeper/leaf.json",
                            "$defs": {"target": {"type": "null"}},
                            "$anchor": "leaf"
                        }
                    }
                }
            },
            "enum": [{"$id": "http://example.com/fake.json"}]
        })
    }

    #[test_case("http://example.com/root.json#/$defs/a", &json!({"type": "integer"}); "absolute pointer")]
    #[test_case("other.json", &json!({"$id": "other.json", "type": "string"}); "exact id")]
    #[test_case("http://example.com/other.json", &json!({"$id": "other.json", "type": "string"}); "absolute id")]
    #[test_case("http://example.com/root.json#named", &json!({"$anchor": "named", "type": "boolean"}); "anchor")]
    #[test_case("http://example.com/nested/deeper/leaf.json#/$defs/target", &json!({"type": "null"}); "nested pointer")]
    fn resolves(reference: &str, expected: &Value) {
        let document = document();
        assert_eq!(resolve(&document, reference), Some(expected));
    }

    #[test]
    fn skips_data_keywords() {
        let document = document();
        assert_eq!(resolve(&document, "http://example.com/fake.json"), None);
    }

    #[test]
    fn root_pointer_without_id() {
        let document = json!({"$defs": {"Node": {"type": "object"}}});
        assert_eq!(
            resolve(&document, "#/$defs/Node"),
            Some(&json!({"type": "object"}))
        );
        assert_eq!(resolve(&document, "#"), Some(&document));
    }

    #[test]
    fn relative_matches_absolute() {
        let document = document();
        let leaf = Url::parse("http://example.com/nested/deeper/leaf.json").expect("Valid URI");
        let relative = lookup(&document, &leaf, "#/$defs/target").expect("Resolvable");
        let absolute = resolve(
            &document,
            "http://example.com/nested/deeper/leaf.json#/$defs/target",
        )
        .expect("Resolvable");
        assert!(std::ptr::eq(relative.contents(), absolute));
        assert_eq!(
            relative.base().as_str(),
            "http://example.com/nested/deeper/leaf.json"
        );
    }

    #[test]
    fn resolved_scope_of_nested_id() {
        let document = document();
        let resolved = lookup(
            &document,
            &uri::root(),
            "http://example.com/root.json#/$defs/d/$defs/e",
        )
        .expect("Resolvable");
        assert_eq!(resolved.base().as_str(), "http://example.com/nested/");
        assert_eq!(
            resolved.resource().get("$id"),
            Some(&json!("nested/"))
        );
    }

    #[test]
    fn missing_pointer() {
        let document = json!({"$defs": {}});
        let error = lookup(&document, &uri::root(), "#/$defs/missing").expect_err("Missing");
        assert_eq!(error, Error::PointerToNowhere { pointer: "/$defs/missing".into() });
    }

    #[test]
    fn missing_anchor() {
        let document = json!({"$defs": {}});
        let error = lookup(&document, &uri::root(), "#nope").expect_err("Missing");
        assert_eq!(error, Error::NoSuchAnchor { anchor: "nope".into() });
    }

    #[test]
    fn missing_resource() {
        let document = json!({});
        let error = lookup(&document, &uri::root(), "http://example.com/x.json").expect_err("Missing");
        assert_eq!(
            error,
            Error::Unresolvable { uri: "http://example.com/x.json".into() }
        );
    }

    #[test]
    fn document_root() {
        let document = json!({"$id": "http://example.com/named.json"});
        let resolved = super::Resolved::document_root(&document);
        assert!(std::ptr::eq(resolved.contents(), &document));
        assert!(std::ptr::eq(resolved.resource(), &document));
        assert_eq!(resolved.base().as_str(), uri::DEFAULT_ROOT_URI);
    }
}
