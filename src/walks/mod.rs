//! Walk sampling algorithms
//!
//! Every algorithm is a function of a [`TripleSource`], an origin entity and
//! its walk parameters, plus the random source to draw from. Callers pass
//! `rand::rng()` during generation and a seeded `ChaCha8Rng` in tests.
//!
//! A walk is a token sequence `e0 p0 e1 p1 ... ek`. Its canonical form is the
//! tokens joined by a single space; that string is what gets deduplicated
//! and written.
//!
//! | Algorithm | Direction | Duplicates |
//! |---|---|---|
//! | [`random_walks_duplicate_free`] | forward, fan-out + trim | no |
//! | [`random_walks`] | forward, one edge per hop | yes |
//! | [`mid_walks`] | both sides, fair coin | yes |
//! | [`mid_walks_duplicate_free`] | both sides, fair coin | no |
//! | [`weighted_mid_walks`] | both sides, degree-weighted | yes |
//! | [`weighted_mid_walks_duplicate_free`] | both sides, degree-weighted | no |
//! | [`node_walks_duplicate_free`] | forward, entities only | no |
//! | [`mid_edge_walks_duplicate_free`] | both sides, edges + origin | no |
//! | [`mid_type_walks_duplicate_free`] | both sides, types + origin | no |
//! | [`text_walks`] | datatype literals | - |
//!
//! "No candidates" always means "stop here and keep what exists so far".

pub mod derived;
pub mod forward;
pub mod mid;
pub mod text;

pub use derived::{
    mid_edge_walks_duplicate_free, mid_type_walks_duplicate_free, node_walks_duplicate_free,
};
pub use forward::{random_walks, random_walks_duplicate_free};
pub use mid::{
    mid_walks, mid_walks_duplicate_free, weighted_mid_walks, weighted_mid_walks_duplicate_free,
};
pub use text::{normalize_text, text_walks, MIN_TEXT_WALK_LENGTH};

use crate::store::{is_anonymous_node, TripleSource, ANONYMOUS_NODE_TOKEN};
use rand::prelude::*;
use std::collections::HashSet;

/// Default predicate used to look up entity types for mid-type walks
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Parameters shared by the graph walk algorithms
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Walks requested per entity
    pub walks_per_entity: usize,

    /// Number of hops per walk
    pub depth: usize,

    /// Emit blank nodes as a single sentinel token in forward walks
    pub unify_anonymous: bool,

    /// Predicates whose objects count as the type of a node
    pub type_predicates: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            walks_per_entity: 100,
            depth: 4,
            unify_anonymous: false,
            type_predicates: vec![RDF_TYPE.to_string()],
        }
    }
}

/// Draw one element uniformly at random; `None` if there are no candidates
#[inline]
pub fn draw<'a, T, R: Rng + ?Sized>(candidates: &'a [T], rng: &mut R) -> Option<&'a T> {
    candidates.choose(rng)
}

/// Join walk tokens into their canonical single-space form
#[inline]
pub fn join_walk(tokens: &[&str]) -> String {
    tokens.join(" ")
}

/// Canonical forms of all walks, keeping duplicates
pub fn to_string_walks<'a, I>(walks: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<&'a str>>,
{
    walks.into_iter().map(|w| join_walk(&w)).collect()
}

/// Canonical forms of all walks with duplicates collapsed
///
/// First occurrence order is preserved so seeded runs stay reproducible.
pub fn to_unique_walks<'a, I>(walks: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<&'a str>>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for walk in walks {
        let line = join_walk(&walk);
        if seen.insert(line.clone()) {
            result.push(line);
        }
    }
    result
}

/// Replace a blank node by the sentinel token when unification is enabled
#[inline]
pub(crate) fn unify<'a>(token: &'a str, unify_anonymous: bool) -> &'a str {
    if unify_anonymous && is_anonymous_node(token) {
        ANONYMOUS_NODE_TOKEN
    } else {
        token
    }
}

/// Objects reachable from `node` through any of the type predicates,
/// sorted so a seeded draw is reproducible
pub(crate) fn type_candidates<'a, S>(source: &'a S, node: &str, type_predicates: &[String]) -> Vec<&'a str>
where
    S: TripleSource + ?Sized,
{
    let mut types: Vec<&str> = type_predicates
        .iter()
        .flat_map(|p| source.successors_with_predicate(node, p))
        .collect();
    types.sort_unstable();
    types.dedup();
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TripleStore;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_draw_empty_and_single() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let empty: [u32; 0] = [];
        assert!(draw(&empty, &mut rng).is_none());
        assert_eq!(draw(&[5], &mut rng), Some(&5));
    }

    #[test]
    fn test_draw_reaches_every_candidate() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let candidates = ["a", "b", "c"];
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(*draw(&candidates, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_to_unique_walks_keeps_first_order() {
        let walks = vec![vec!["A", "p", "B"], vec!["A", "q", "C"], vec!["A", "p", "B"]];
        assert_eq!(to_unique_walks(walks.clone()), vec!["A p B", "A q C"]);
        assert_eq!(to_string_walks(walks).len(), 3);
    }

    #[test]
    fn test_unify() {
        assert_eq!(unify("_:b1", true), ANONYMOUS_NODE_TOKEN);
        assert_eq!(unify("_:b1", false), "_:b1");
        assert_eq!(unify("http://x", true), "http://x");
    }

    #[test]
    fn test_type_candidates_union_over_predicates() {
        let mut store = TripleStore::new();
        store.insert("I", RDF_TYPE, "C1");
        store.insert("I", "kind", "C2");
        store.insert("I", "kind", "C1");
        store.insert("I", "other", "X");

        let preds = vec![RDF_TYPE.to_string(), "kind".to_string()];
        assert_eq!(type_candidates(&store, "I", &preds), vec!["C1", "C2"]);
        assert!(type_candidates(&store, "J", &preds).is_empty());
    }
}
