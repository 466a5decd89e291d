//! In-memory, bidirectionally indexed triple store
//!
//! Every object triple lives in exactly one forward bucket (keyed by subject)
//! and exactly one backward bucket (keyed by object). Literal values are kept
//! apart in a subject -> predicate -> texts map and never reach the object
//! indices.
//!
//! The store is populated through `&mut self` and shared read-only afterwards
//! (`Arc<TripleStore>`), so population always happens-before sampling.

use crate::store::triple::Triple;
use crate::store::TripleSource;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Datatype facts of one subject: predicate -> set of literal texts
pub type DatatypeFacts = HashMap<Arc<str>, HashSet<String>>;

/// In-memory triple store
#[derive(Debug, Default)]
pub struct TripleStore {
    /// subject -> outgoing object triples
    forward: HashMap<Arc<str>, Vec<Triple>>,

    /// object -> incoming object triples
    backward: HashMap<Arc<str>, Vec<Triple>>,

    /// subject -> predicate -> literal texts
    datatype: HashMap<Arc<str>, DatatypeFacts>,

    /// Interned URI strings
    interner: HashSet<Arc<str>>,

    /// Number of object triples
    object_triples: u64,

    /// Number of distinct datatype facts
    datatype_facts: u64,
}

impl TripleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, value: &str) -> Arc<str> {
        if let Some(existing) = self.interner.get(value) {
            return Arc::clone(existing);
        }
        let value: Arc<str> = Arc::from(value);
        self.interner.insert(Arc::clone(&value));
        value
    }

    /// Insert an object triple. Returns `false` if it was already present.
    pub fn insert(&mut self, subject: &str, predicate: &str, object: &str) -> bool {
        let triple = Triple {
            subject: self.intern(subject),
            predicate: self.intern(predicate),
            object: self.intern(object),
        };
        self.insert_triple(triple)
    }

    fn insert_triple(&mut self, triple: Triple) -> bool {
        if self.contains(&triple) {
            return false;
        }

        self.forward
            .entry(Arc::clone(&triple.subject))
            .or_default()
            .push(triple.clone());
        self.backward
            .entry(Arc::clone(&triple.object))
            .or_default()
            .push(triple);
        self.object_triples += 1;
        true
    }

    /// Whether an identical object triple is already indexed
    ///
    /// Only the shorter of the subject's forward bucket and the object's
    /// backward bucket is scanned.
    pub fn contains(&self, triple: &Triple) -> bool {
        let outgoing = self.forward.get(&triple.subject).map_or(0, Vec::len);
        let incoming = self.backward.get(&triple.object).map_or(0, Vec::len);
        if outgoing == 0 || incoming == 0 {
            return false;
        }

        let bucket = if outgoing <= incoming {
            &self.forward[&triple.subject]
        } else {
            &self.backward[&triple.object]
        };
        bucket.iter().any(|t| t == triple)
    }

    /// Insert a datatype fact. Returns `false` if the text was already recorded.
    pub fn insert_datatype(&mut self, subject: &str, predicate: &str, text: &str) -> bool {
        let subject = self.intern(subject);
        let predicate = self.intern(predicate);
        let added = self
            .datatype
            .entry(subject)
            .or_default()
            .entry(predicate)
            .or_default()
            .insert(text.to_string());
        if added {
            self.datatype_facts += 1;
        }
        added
    }

    /// Move every triple and datatype fact of `other` into this store.
    ///
    /// Used as the join barrier after parallel ingestion: each loader thread
    /// fills a private store and the results are merged before sampling.
    pub fn merge(&mut self, other: TripleStore) {
        for (_, bucket) in other.forward {
            for triple in bucket {
                self.insert(&triple.subject, &triple.predicate, &triple.object);
            }
        }
        for (subject, facts) in other.datatype {
            for (predicate, texts) in facts {
                for text in texts {
                    self.insert_datatype(&subject, &predicate, &text);
                }
            }
        }
    }

    /// Number of distinct datatype facts
    pub fn datatype_size(&self) -> u64 {
        self.datatype_facts
    }

    /// Subjects of object triples
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.forward.keys().map(|k| k.as_ref())
    }

    /// Objects of object triples
    pub fn objects(&self) -> impl Iterator<Item = &str> {
        self.backward.keys().map(|k| k.as_ref())
    }

    /// Subjects of datatype facts
    pub fn datatype_subjects(&self) -> impl Iterator<Item = &str> {
        self.datatype.keys().map(|k| k.as_ref())
    }
}

impl TripleSource for TripleStore {
    fn successors(&self, subject: &str) -> &[Triple] {
        self.forward.get(subject).map(Vec::as_slice).unwrap_or(&[])
    }

    fn predecessors(&self, object: &str) -> &[Triple] {
        self.backward.get(object).map(Vec::as_slice).unwrap_or(&[])
    }

    fn datatype_facts(&self, subject: &str) -> Vec<(&str, &str)> {
        let Some(facts) = self.datatype.get(subject) else {
            return Vec::new();
        };
        facts
            .iter()
            .flat_map(|(predicate, texts)| {
                texts
                    .iter()
                    .map(move |text| (predicate.as_ref(), text.as_str()))
            })
            .collect()
    }

    fn size(&self) -> u64 {
        self.object_triples
    }

    fn is_empty(&self) -> bool {
        self.object_triples == 0 && self.datatype_facts == 0
    }

    fn entities(&self) -> HashSet<String> {
        let mut result =
            HashSet::with_capacity(self.forward.len() + self.backward.len() + self.datatype.len());
        result.extend(self.subjects().map(str::to_string));
        result.extend(self.objects().map(str::to_string));
        result.extend(self.datatype_subjects().map(str::to_string));
        result
    }
}
