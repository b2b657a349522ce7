//! # referencing
//!
//! Lexical scope tracking and reference resolution for in-memory schema documents.
//!
//! Nothing here is fetched over the network: every document a reference may point to is
//! expected to be already loaded.
mod error;
mod pointer;
mod resolver;
mod scope;
pub mod uri;

pub use error::Error;
pub use pointer::{parse_index, pointer, unescape_segment};
pub use resolver::{lookup, resolve, Resolved};
pub use scope::ScopeStack;
pub use url::Url;
