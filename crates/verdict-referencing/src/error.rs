use core::fmt;

/// Errors that can occur while resolving references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The reference could not be parsed as a URI reference.
    InvalidUri {
        reference: String,
        source: url::ParseError,
    },
    /// A JSON Pointer fragment points to a location that does not exist.
    PointerToNowhere { pointer: String },
    /// A plain-name fragment does not match any `$anchor`.
    NoSuchAnchor { anchor: String },
    /// No node in the document tree carries the requested URI.
    Unresolvable { uri: String },
    /// `$dynamicRef` is recognized but never resolved.
    DynamicReference { reference: String },
}

impl Error {
    pub(crate) fn invalid_uri(reference: impl Into<String>, source: url::ParseError) -> Error {
        Error::InvalidUri {
            reference: reference.into(),
            source,
        }
    }
    pub(crate) fn pointer_to_nowhere(pointer: impl Into<String>) -> Error {
        Error::PointerToNowhere {
            pointer: pointer.into(),
        }
    }
    pub(crate) fn no_such_anchor(anchor: impl Into<String>) -> Error {
        Error::NoSuchAnchor {
            anchor: anchor.into(),
        }
    }
    pub(crate) fn unresolvable(uri: impl Into<String>) -> Error {
        Error::Unresolvable { uri: uri.into() }
    }
    pub(crate) fn dynamic_reference(reference: impl Into<String>) -> Error {
        Error::DynamicReference {
            reference: reference.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidUri { reference, .. } => {
                write!(f, "Invalid URI reference '{reference}'")
            }
            Error::PointerToNowhere { pointer } => {
                write!(f, "Pointer '{pointer}' does not exist")
            }
            Error::NoSuchAnchor { anchor } => write!(f, "Anchor '{anchor}' does not exist"),
            Error::Unresolvable { uri } => write!(f, "Resource '{uri}' is not present"),
            Error::DynamicReference { reference } => {
                write!(f, "Dynamic reference '{reference}' is not supported")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidUri { source, .. } => Some(source),
            _ => None,
        }
    }
}
