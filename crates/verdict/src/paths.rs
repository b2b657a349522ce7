//! Facilities for working with paths within schemas or validated instances.
use std::{fmt, sync::Arc};

/// A key within a JSON object or an index within a JSON array.
/// A sequence of chunks represents a valid path within a JSON value.
///
/// Example:
/// ```json
/// {
///    "cmd": ["ls", "-lh", "/home"]
/// }
/// ```
///
/// To extract "/home" from the JSON above, one should take the "cmd" property and then
/// the element at index 2 of the resulting array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSegment<'a> {
    /// Property name within a JSON object.
    Property(&'a str),
    /// Index within a JSON array.
    Index(usize),
}

impl fmt::Display for LocationSegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationSegment::Property(property) => f.write_str(property),
            LocationSegment::Index(idx) => f.write_str(itoa::Buffer::new().format(*idx)),
        }
    }
}

impl<'a> From<&'a str> for LocationSegment<'a> {
    #[inline]
    fn from(value: &'a str) -> LocationSegment<'a> {
        LocationSegment::Property(value)
    }
}

impl<'a> From<&'a String> for LocationSegment<'a> {
    #[inline]
    fn from(value: &'a String) -> LocationSegment<'a> {
        LocationSegment::Property(value)
    }
}

impl From<usize> for LocationSegment<'_> {
    #[inline]
    fn from(value: usize) -> Self {
        LocationSegment::Index(value)
    }
}

/// A lazily constructed location within a JSON instance.
///
/// Locations are built only when an error record needs one, walking the parent chain.
#[derive(Debug, Clone, Copy)]
pub struct LazyLocation<'a, 'b> {
    pub(crate) segment: LocationSegment<'a>,
    pub(crate) parent: Option<&'b LazyLocation<'b, 'a>>,
}

impl Default for LazyLocation<'_, '_> {
    fn default() -> Self {
        LazyLocation::new()
    }
}

impl<'a> LazyLocation<'a, '_> {
    /// Create a root node of a JSON pointer.
    #[must_use]
    pub const fn new() -> Self {
        LazyLocation {
            // The value does not matter, it will never be used
            segment: LocationSegment::Index(0),
            parent: None,
        }
    }

    /// Push a new segment to the JSON pointer.
    #[inline]
    #[must_use]
    pub fn push(&'a self, segment: impl Into<LocationSegment<'a>>) -> Self {
        LazyLocation {
            segment: segment.into(),
            parent: Some(self),
        }
    }
}

impl<'a> From<&'a LazyLocation<'_, '_>> for Location {
    fn from(value: &'a LazyLocation<'_, '_>) -> Self {
        let mut segments = Vec::new();
        let mut head = value;
        while let Some(parent) = head.parent {
            segments.push(head.segment);
            head = parent;
        }
        let mut buffer = String::new();
        for segment in segments.iter().rev() {
            buffer.push('/');
            push_escaped(&mut buffer, segment);
        }
        Location(Arc::new(buffer))
    }
}

/// A cheap to clone JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Location(Arc<String>);

impl serde::Serialize for Location {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Location {
    /// Create a new, empty `Location`.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(String::new()))
    }

    /// Append a segment, returning a new location.
    #[must_use]
    pub fn join<'a>(&self, segment: impl Into<LocationSegment<'a>>) -> Self {
        let mut buffer = String::with_capacity(self.0.len() + 8);
        buffer.push_str(&self.0);
        buffer.push('/');
        push_escaped(&mut buffer, &segment.into());
        Self(Arc::new(buffer))
    }

    /// Borrow the pointer as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Location {
    fn eq(&self, other: &str) -> bool {
        self.0.as_str() == other
    }
}

impl PartialEq<&str> for Location {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_str() == *other
    }
}

fn push_escaped(buffer: &mut String, segment: &LocationSegment<'_>) {
    match segment {
        LocationSegment::Property(property) => {
            for ch in property.chars() {
                match ch {
                    '~' => buffer.push_str("~0"),
                    '/' => buffer.push_str("~1"),
                    _ => buffer.push(ch),
                }
            }
        }
        LocationSegment::Index(idx) => buffer.push_str(itoa::Buffer::new().format(*idx)),
    }
}

#[cfg(test)]
mod tests {
    use super::{LazyLocation, Location};

    #[test]
    fn join_escapes() {
        let location = Location::new().join("properties").join("a/b~c").join(3);
        assert_eq!(location.as_str(), "/properties/a~1b~0c/3");
    }

    #[test]
    fn lazy_location() {
        let root = LazyLocation::new();
        let first = root.push("items");
        let second = first.push(2);
        assert_eq!(Location::from(&second).as_str(), "/items/2");
        assert_eq!(Location::from(&root).as_str(), "");
    }
}
