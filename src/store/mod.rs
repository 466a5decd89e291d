//! Triple storage
//!
//! Walk algorithms are written against the [`TripleSource`] capability set
//! (successor lookup, predecessor lookup, optional datatype lookup) rather
//! than a concrete store. [`TripleStore`] is the in-memory implementation.
//!
//! # Architecture
//!
//! ```text
//!     ingestion threads (one per file)
//!        │        │        │
//!        ▼        ▼        ▼
//!   TripleStore TripleStore TripleStore      (private, &mut)
//!        └────────┼────────┘
//!                 ▼  merge (join barrier)
//!        Arc<TripleStore>                    (shared, read-only)
//!        ├── forward:  subject -> [Triple]
//!        ├── backward: object  -> [Triple]
//!        └── datatype: subject -> predicate -> {text}
//! ```

pub mod memory;
pub mod triple;

pub use memory::{DatatypeFacts, TripleStore};
pub use triple::{is_anonymous_node, strip_tags, Triple, ANONYMOUS_NODE_TOKEN};

use std::collections::HashSet;

/// Read-side capabilities every walk algorithm relies on
///
/// Implementations must be safe to query from many worker threads at once.
/// Unknown keys yield empty slices, never errors.
pub trait TripleSource: Send + Sync {
    /// Object triples whose subject is `subject`
    fn successors(&self, subject: &str) -> &[Triple];

    /// Object triples whose object is `object`
    fn predecessors(&self, object: &str) -> &[Triple];

    /// Objects reachable from `subject` through `predicate`
    fn successors_with_predicate<'a>(&'a self, subject: &str, predicate: &str) -> HashSet<&'a str> {
        self.successors(subject)
            .iter()
            .filter(|t| t.predicate.as_ref() == predicate)
            .map(|t| t.object.as_ref())
            .collect()
    }

    /// `(predicate, text)` datatype facts of `subject`; empty when the source
    /// does not keep literals
    fn datatype_facts(&self, _subject: &str) -> Vec<(&str, &str)> {
        Vec::new()
    }

    /// Number of object triples
    fn size(&self) -> u64;

    /// True when the source holds neither object triples nor datatype facts
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Every entity known to the source (subjects and objects)
    fn entities(&self) -> HashSet<String>;
}
