use std::borrow::Cow;

use serde_json::Value;

/// Unescape a single JSON Pointer reference token.
#[must_use]
pub fn unescape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Evaluate a JSON Pointer against a document.
#[must_use]
pub fn pointer<'a>(document: &'a Value, pointer: &str) -> Option<&'a Value> {
    if pointer.is_empty() {
        return Some(document);
    }
    if !pointer.starts_with('/') {
        return None;
    }
    pointer.split('/').skip(1).map(unescape_segment).try_fold(
        document,
        |target, token| match target {
            Value::Object(map) => map.get(&*token),
            Value::Array(list) => parse_index(&token).and_then(|x| list.get(x)),
            _ => None,
        },
    )
}

// Taken from `serde_json`.
#[must_use]
pub fn parse_index(s: &str) -> Option<usize> {
    if s.starts_with('+') || (s.starts_with('0') && s.len() != 1) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::{parse_index, pointer, unescape_segment};
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn empty_pointer() {
        let document = json!({});
        assert_eq!(pointer(&document, ""), Some(&document));
    }

    #[test_case("/$defs/a", Some(json!(1)))]
    #[test_case("/$defs/b~1c", Some(json!(2)))]
    #[test_case("/$defs/d~0e", Some(json!(3)))]
    #[test_case("/items/1", Some(json!(false)))]
    #[test_case("/items/01", None)]
    #[test_case("/missing", None)]
    #[test_case("no-slash", None)]
    fn resolves(path: &str, expected: Option<serde_json::Value>) {
        let document = json!({
            "$defs": {"a": 1, "b/c": 2, "d~e": 3},
            "items": [true, false]
        });
        assert_eq!(pointer(&document, path).cloned(), expected);
    }

    #[test_case("0", Some(0))]
    #[test_case("12", Some(12))]
    #[test_case("+1", None)]
    #[test_case("007", None)]
    fn index(input: &str, expected: Option<usize>) {
        assert_eq!(parse_index(input), expected);
    }

    #[test]
    fn unescape_order() {
        assert_eq!(unescape_segment("~01"), "~1");
    }
}
