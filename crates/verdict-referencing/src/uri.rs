//! URI helpers shared by the scope stack and the resolver.
use std::{borrow::Cow, sync::LazyLock};

use percent_encoding::percent_decode_str;
use url::{Position, Url};

use crate::Error;

/// Base URI assigned to documents that do not declare an absolute `$id`.
pub const DEFAULT_ROOT_URI: &str = "memory://root/";

static ROOT: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_ROOT_URI).expect("Default root URI is valid"));

/// The synthetic root URI every lexical scope starts from.
#[must_use]
pub fn root() -> Url {
    ROOT.clone()
}

/// Resolve a URI reference against a base URI.
///
/// # Errors
///
/// If the reference is not a valid URI reference.
pub fn resolve_against(base: &Url, reference: &str) -> Result<Url, Error> {
    base.join(reference)
        .map_err(|error| Error::invalid_uri(reference, error))
}

/// Whether two URIs identify the same resource, ignoring fragments.
#[must_use]
pub fn same_resource(left: &Url, right: &Url) -> bool {
    left[..Position::AfterQuery] == right[..Position::AfterQuery]
}

/// Percent-decoded fragment of a URI, if any.
#[must_use]
pub fn fragment(uri: &Url) -> Option<Cow<'_, str>> {
    uri.fragment()
        .map(|fragment| percent_decode_str(fragment).decode_utf8_lossy())
}
