//! Triple type and URI normalization helpers
//!
//! Triples hold interned `Arc<str>` components so that the forward and
//! backward indices can share one allocation per distinct URI.

use std::fmt;
use std::sync::Arc;

/// Token emitted in place of blank nodes when anonymous nodes are unified
pub const ANONYMOUS_NODE_TOKEN: &str = "ANode";

/// An immutable (subject, predicate, object) statement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    /// Subject URI or blank node id
    pub subject: Arc<str>,

    /// Predicate URI
    pub predicate: Arc<str>,

    /// Object URI or blank node id
    pub object: Arc<str>,
}

impl Triple {
    /// Create a triple from already-normalized components
    pub fn new(
        subject: impl Into<Arc<str>>,
        predicate: impl Into<Arc<str>>,
        object: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// Remove a leading `<` and a trailing `>` if present
pub fn strip_tags(value: &str) -> &str {
    let value = value.strip_prefix('<').unwrap_or(value);
    value.strip_suffix('>').unwrap_or(value)
}

/// Check whether a token names a blank node (`_:genid42`)
pub fn is_anonymous_node(token: &str) -> bool {
    token.trim_start().starts_with("_:")
}
