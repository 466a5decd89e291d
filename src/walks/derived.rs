//! Walks derived from already sampled forward or mid walks
//!
//! These are post-processing passes: a walk is first materialized in full by
//! the forward or mid algorithm and only then filtered or rewritten.

use super::forward::{duplicate_free_paths, path_tokens};
use super::mid::{mid_walk_batch, SideChoice};
use super::{draw, to_unique_walks, type_candidates};
use crate::store::TripleSource;
use rand::prelude::*;

/// Node walks: duplicate-free forward walks with every edge token removed
pub fn node_walks_duplicate_free<S, R>(
    source: &S,
    entity: &str,
    walks_per_entity: usize,
    depth: usize,
    unify_anonymous: bool,
    rng: &mut R,
) -> Vec<String>
where
    S: TripleSource + ?Sized,
    R: Rng + ?Sized,
{
    let paths = duplicate_free_paths(source, entity, walks_per_entity, depth, rng);
    to_unique_walks(paths.iter().map(|path| {
        path_tokens(entity, path, unify_anonymous)
            .into_iter()
            .step_by(2)
            .collect::<Vec<_>>()
    }))
}

/// Pick which occurrence of the origin among the entity positions survives
///
/// Returns the token index of the kept occurrence.
fn kept_origin_index<R: Rng + ?Sized>(walk: &[&str], entity: &str, rng: &mut R) -> Option<usize> {
    let occurrences: Vec<usize> = walk
        .iter()
        .enumerate()
        .step_by(2)
        .filter(|(_, token)| **token == entity)
        .map(|(i, _)| i)
        .collect();
    draw(&occurrences, rng).copied()
}

/// Mid-edge walks: mid walks reduced to their edges plus one origin token
///
/// One occurrence of the origin is drawn and kept; every other entity
/// token, including further occurrences of the origin, is dropped.
pub fn mid_edge_walks_duplicate_free<S, R>(
    source: &S,
    entity: &str,
    walks_per_entity: usize,
    depth: usize,
    rng: &mut R,
) -> Vec<String>
where
    S: TripleSource + ?Sized,
    R: Rng + ?Sized,
{
    let walks = mid_walk_batch(source, entity, walks_per_entity, depth, SideChoice::Uniform, rng);
    let mut reduced = Vec::with_capacity(walks.len());

    for walk in walks {
        let keep = kept_origin_index(&walk, entity, rng);
        let tokens: Vec<&str> = walk
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 2 == 1 || Some(*i) == keep)
            .map(|(_, token)| *token)
            .collect();
        reduced.push(tokens);
    }

    to_unique_walks(reduced)
}

/// Mid-type walks: mid walks with every entity but one origin occurrence
/// replaced by one of its types
///
/// Types are objects reachable through any of `type_predicates`. An entity
/// without a type is dropped instead of replaced. Edge tokens are kept.
pub fn mid_type_walks_duplicate_free<S, R>(
    source: &S,
    entity: &str,
    walks_per_entity: usize,
    depth: usize,
    type_predicates: &[String],
    rng: &mut R,
) -> Vec<String>
where
    S: TripleSource + ?Sized,
    R: Rng + ?Sized,
{
    let walks = mid_walk_batch(source, entity, walks_per_entity, depth, SideChoice::Uniform, rng);
    let mut rewritten = Vec::with_capacity(walks.len());

    for walk in walks {
        let keep = kept_origin_index(&walk, entity, rng);
        let mut tokens: Vec<&str> = Vec::with_capacity(walk.len());

        for (i, &token) in walk.iter().enumerate() {
            if i % 2 == 1 || Some(i) == keep {
                tokens.push(token);
                continue;
            }
            let types = type_candidates(source, token, type_predicates);
            if let Some(&replacement) = draw(&types, rng) {
                tokens.push(replacement);
            }
        }
        rewritten.push(tokens);
    }

    to_unique_walks(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TripleStore;
    use crate::walks::RDF_TYPE;
    use rand_chacha::ChaCha8Rng;

    fn dummy_graph() -> TripleStore {
        let mut store = TripleStore::new();
        store.insert("A", "P1", "B");
        store.insert("B", "P2", "C");
        store.insert("C", "P3", "D");
        store.insert("A", "P4", "E");
        store.insert("E", "P5", "D");
        store.insert("E", "P6", "F");
        store.insert("V1", "P7", "V2");
        store.insert("V3", "P8", "V2");
        store.insert("V2", "P9", "V4");
        store
    }

    #[test]
    fn test_node_walks_contain_no_edges() {
        let store = dummy_graph();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let walks = node_walks_duplicate_free(&store, "A", 100, 8, false, &mut rng);
        assert!(walks.len() >= 2);
        for walk in &walks {
            assert!(walk.starts_with('A'));
            assert!(!walk.contains('P'), "edge token in {}", walk);
        }
        assert!(walks.contains(&"A B C D".to_string()));
    }

    #[test]
    fn test_node_walks_collapse_duplicates() {
        // Two parallel edges give two forward walks but one node walk
        let mut store = TripleStore::new();
        store.insert("A", "p", "B");
        store.insert("A", "q", "B");
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        let walks = node_walks_duplicate_free(&store, "A", 10, 2, false, &mut rng);
        assert_eq!(walks, vec!["A B".to_string()]);
    }

    #[test]
    fn test_mid_edge_walks_from_source_only_entity() {
        // A never appears as object, so every walk starts with A followed by edges
        let store = dummy_graph();
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let walks = mid_edge_walks_duplicate_free(&store, "A", 100, 8, &mut rng);
        assert!(!walks.is_empty());
        for walk in &walks {
            let tokens: Vec<_> = walk.split(' ').collect();
            assert_eq!(tokens[0], "A");
            assert!(tokens[1..].iter().all(|t| t.starts_with('P')), "bad walk {}", walk);
        }
    }

    #[test]
    fn test_mid_edge_walks_keep_exactly_one_entity() {
        let store = dummy_graph();
        let mut rng = ChaCha8Rng::seed_from_u64(24);
        for walk in mid_edge_walks_duplicate_free(&store, "V2", 100, 8, &mut rng) {
            let entities: Vec<_> = walk.split(' ').filter(|t| !t.starts_with('P')).collect();
            assert_eq!(entities, vec!["V2"], "bad walk {}", walk);
        }
    }

    #[test]
    fn test_mid_edge_walks_with_cycle_keep_one_origin() {
        let mut store = TripleStore::new();
        store.insert("V1", "P1", "V2");
        store.insert("V2", "P2", "V1");
        let mut rng = ChaCha8Rng::seed_from_u64(25);
        let depth = 4;
        for walk in mid_edge_walks_duplicate_free(&store, "V1", 100, depth, &mut rng) {
            let tokens: Vec<_> = walk.split(' ').collect();
            assert!(tokens.len() <= depth + 1);
            assert_eq!(tokens.iter().filter(|t| **t == "V1").count(), 1);
            assert!(!tokens.contains(&"V2"));
        }
    }

    #[test]
    fn test_mid_type_walks_replace_or_drop_entities() {
        let mut store = TripleStore::new();
        store.insert("I_Jan", "P_knows", "I_Sven");
        store.insert("I_Jan", RDF_TYPE, "C_human");
        store.insert("I_Sven", RDF_TYPE, "C_human");
        store.insert("I_Anna", "P_knows", "I_Jan");

        let types = vec![RDF_TYPE.to_string()];
        let mut rng = ChaCha8Rng::seed_from_u64(26);
        let walks = mid_type_walks_duplicate_free(&store, "I_Jan", 150, 2, &types, &mut rng);
        assert!(!walks.is_empty());

        for walk in &walks {
            let instances = walk.split(' ').filter(|t| t.starts_with("I_")).count();
            assert_eq!(instances, 1, "bad walk {}", walk);
            assert!(walk.contains("I_Jan"));
            assert!(!walk.contains("I_Anna"));
            assert!(!walk.contains("I_Sven"));
        }
        // I_Anna has no type and is dropped, I_Sven becomes C_human
        assert!(walks.contains(&"P_knows I_Jan P_knows C_human".to_string()));
    }
}
