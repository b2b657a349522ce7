use core::fmt;
use std::borrow::Cow;

/// A compiled `pattern` / `patternProperties` regular expression.
///
/// Patterns are unanchored searches. Literal prefix and exact patterns skip the regex engine,
/// `regex` is tried next and `fancy-regex` handles look-around and backreferences.
pub struct Pattern {
    engine: Engine,
}

enum Engine {
    Literal(LiteralMatcher),
    Standard(regex::Regex),
    Backtracking(fancy_regex::Regex),
}

impl Pattern {
    pub(crate) fn new(source: &str) -> Result<Pattern, PatternError> {
        let engine = if let Some(optimization) = analyze_pattern(source) {
            let original = source.to_string();
            Engine::Literal(match optimization {
                PatternOptimization::Prefix(literal) => LiteralMatcher::Prefix { literal, original },
                PatternOptimization::Exact(exact) => LiteralMatcher::Exact { exact, original },
            })
        } else {
            let translated = translate(source);
            match regex::Regex::new(&translated) {
                Ok(regex) => Engine::Standard(regex),
                Err(_) => fancy_regex::Regex::new(&translated)
                    .or_else(|_| fancy_regex::Regex::new(source))
                    .map(Engine::Backtracking)
                    .map_err(|error| PatternError {
                        pattern: source.to_string(),
                        message: error.to_string(),
                    })?,
            }
        };
        Ok(Pattern { engine })
    }

    /// Search `text` for a match.
    ///
    /// Backtracking limits count as a mismatch.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        match &self.engine {
            Engine::Literal(LiteralMatcher::Prefix { literal, .. }) => {
                text.starts_with(literal.as_str())
            }
            Engine::Literal(LiteralMatcher::Exact { exact, .. }) => text == exact,
            Engine::Standard(regex) => regex.is_match(text),
            Engine::Backtracking(regex) => regex.is_match(text).unwrap_or(false),
        }
    }

    /// The pattern source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match &self.engine {
            Engine::Literal(
                LiteralMatcher::Prefix { original, .. } | LiteralMatcher::Exact { original, .. },
            ) => original,
            Engine::Standard(regex) => regex.as_str(),
            Engine::Backtracking(regex) => regex.as_str(),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

/// Rewrite the escapes whose ECMA-262 meaning is ASCII-only.
///
/// `\d`, `\w` and their negations become explicit ASCII classes, `\b` and `\B` become ASCII
/// word boundaries. Inside a bracket class only the positive forms can be inlined.
fn translate(source: &str) -> Cow<'_, str> {
    if !source.contains('\\') {
        return Cow::Borrowed(source);
    }
    let mut output = String::with_capacity(source.len() + 16);
    let mut in_class = false;
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    output.push(c);
                    break;
                };
                match (escaped, in_class) {
                    ('d', false) => output.push_str("[0-9]"),
                    ('D', false) => output.push_str("[^0-9]"),
                    ('w', false) => output.push_str("[A-Za-z0-9_]"),
                    ('W', false) => output.push_str("[^A-Za-z0-9_]"),
                    ('b', false) => output.push_str(r"(?-u:\b)"),
                    ('B', false) => output.push_str(r"(?-u:\B)"),
                    ('d', true) => output.push_str("0-9"),
                    ('w', true) => output.push_str("A-Za-z0-9_"),
                    _ => {
                        output.push(c);
                        output.push(escaped);
                    }
                }
            }
            '[' if !in_class => {
                in_class = true;
                output.push(c);
                if let Some(negation) = chars.next_if_eq(&'^') {
                    output.push(negation);
                }
                // A `]` right after the opening bracket is a literal
                if let Some(bracket) = chars.next_if_eq(&']') {
                    output.push(bracket);
                }
            }
            ']' if in_class => {
                in_class = false;
                output.push(c);
            }
            _ => output.push(c),
        }
    }
    Cow::Owned(output)
}

/// A pattern that neither regex engine accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PatternError {
    pub(crate) pattern: String,
    pub(crate) message: String,
}

/// Matcher for literal patterns: either `starts_with` (prefix) or `==` (exact).
enum LiteralMatcher {
    Prefix { literal: String, original: String },
    Exact { exact: String, original: String },
}

/// Result of analyzing a regex pattern for literal-match optimizations.
#[derive(Debug, PartialEq)]
pub(crate) enum PatternOptimization {
    /// `^prefix`: use `starts_with(prefix)`.
    Prefix(String),
    /// `^exact$`: use `== exact`.
    Exact(String),
}

/// Analyze a pattern and return a [`PatternOptimization`] if one applies, or `None` if a full
/// regex engine is required.
///
/// Accepts unescaped alphanumeric chars, `-`, `_`, `/` and the safe escape sequences
/// `\/` → `/`, `\-` → `-`, `\_` → `_`, `\$` → `$`, `\.` → `.` in the literal body.
/// A trailing `$` anchor (unescaped) promotes the result to [`PatternOptimization::Exact`].
pub(crate) fn analyze_pattern(pattern: &str) -> Option<PatternOptimization> {
    let suffix = pattern.strip_prefix('^')?;
    let mut literal = String::new();
    let mut chars = suffix.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next()? {
                c @ ('/' | '-' | '_' | '$' | '.') => literal.push(c),
                _ => return None,
            }
        } else if c == '$' {
            // Unescaped `$` is only valid as the very last character (end anchor).
            if chars.peek().is_none() {
                return Some(PatternOptimization::Exact(literal));
            }
            return None;
        } else if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/') {
            literal.push(c);
        } else {
            return None;
        }
    }
    Some(PatternOptimization::Prefix(literal))
}

#[cfg(test)]
mod tests {
    use super::{analyze_pattern, translate, Pattern, PatternOptimization};
    use test_case::test_case;

    #[test_case("^foo", Some(PatternOptimization::Prefix("foo".into())))]
    #[test_case("^\\$ref$", Some(PatternOptimization::Exact("$ref".into())))]
    #[test_case("^x-", Some(PatternOptimization::Prefix("x-".into())))]
    #[test_case("foo", None)]
    #[test_case("^fo+", None)]
    #[test_case("^a$b", None)]
    fn analyze(pattern: &str, expected: Option<PatternOptimization>) {
        assert_eq!(analyze_pattern(pattern), expected);
    }

    #[test_case("^(?!eo:)", "eo:bands", false)]
    #[test_case("^(?!eo:)", "proj:epsg", true)]
    #[test_case("^\\$ref$", "$ref", true)]
    #[test_case("^\\$ref$", "$refs", false)]
    #[test_case("a+", "baaa", true)]
    #[test_case("^[0-9]+$", "12a", false)]
    fn matching(pattern: &str, text: &str, expected: bool) {
        let pattern = Pattern::new(pattern).expect("Valid pattern");
        assert_eq!(pattern.is_match(text), expected);
    }

    #[test_case(r"\d", "\u{661}", false; "digits are ascii")]
    #[test_case(r"\d", "7", true)]
    #[test_case(r"^\w+$", "caf\u{e9}", false; "word characters are ascii")]
    #[test_case(r"^\W$", "\u{e9}", true)]
    #[test_case(r"^[\d.]+$", "1.5", true)]
    #[test_case(r"^[\d.]+$", "\u{661}", false; "digits inside a class")]
    #[test_case(r"\bfoo\b", "a foo b", true)]
    #[test_case(r"\bfoo\b", "afoo", false)]
    #[test_case(r"^\\d$", r"\d", true; "escaped backslash")]
    #[test_case(r"^(?=\d)\w+$", "\u{661}1", false; "backtracking engine")]
    fn ecma_classes(pattern: &str, text: &str, expected: bool) {
        let pattern = Pattern::new(pattern).expect("Valid pattern");
        assert_eq!(pattern.is_match(text), expected);
    }

    #[test_case(r"a\d", "a[0-9]")]
    #[test_case(r"[\w-]", "[A-Za-z0-9_-]")]
    #[test_case(r"[]\d]", "[]0-9]")]
    #[test_case(r"[^]\d]\d", "[^]0-9][0-9]")]
    #[test_case(r"\\d", r"\\d")]
    #[test_case("plain", "plain")]
    fn translation(pattern: &str, expected: &str) {
        assert_eq!(translate(pattern), expected);
    }

    #[test]
    fn invalid_pattern() {
        let error = Pattern::new("(unclosed").expect_err("Invalid pattern");
        assert_eq!(error.pattern, "(unclosed");
    }
}
