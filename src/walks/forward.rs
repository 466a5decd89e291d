//! Forward random walks
//!
//! Forward walks only ever follow outgoing edges, so every walk starts with
//! the origin entity.

use super::{draw, to_string_walks, to_unique_walks, unify};
use crate::store::{Triple, TripleSource};
use rand::prelude::*;

/// Duplicate-free forward walks as triple paths
///
/// The frontier starts with one path per direct successor of `entity`. On
/// each following hop every path is replaced by all of its one-edge
/// extensions; a path whose last node has no successors is kept as is.
/// After every hop the frontier is trimmed to `walks_per_entity` paths by
/// removing uniformly random elements.
pub(crate) fn duplicate_free_paths<'a, S, R>(
    source: &'a S,
    entity: &str,
    walks_per_entity: usize,
    depth: usize,
    rng: &mut R,
) -> Vec<Vec<&'a Triple>>
where
    S: TripleSource + ?Sized,
    R: Rng + ?Sized,
{
    let mut frontier: Vec<Vec<&'a Triple>> = Vec::new();

    for hop in 0..depth {
        if hop == 0 {
            let first = source.successors(entity);
            if first.is_empty() {
                return Vec::new();
            }
            frontier = first.iter().map(|t| vec![t]).collect();
        } else {
            let mut next = Vec::with_capacity(frontier.len());
            for path in frontier.drain(..) {
                let extensions: &[Triple] = match path.last() {
                    Some(last) => source.successors(&last.object),
                    None => &[],
                };
                if extensions.is_empty() {
                    next.push(path);
                    continue;
                }
                for triple in extensions {
                    let mut extended = Vec::with_capacity(path.len() + 1);
                    extended.extend_from_slice(&path);
                    extended.push(triple);
                    next.push(extended);
                }
            }
            frontier = next;
        }

        while frontier.len() > walks_per_entity {
            let victim = rng.random_range(0..frontier.len());
            frontier.swap_remove(victim);
        }
    }

    frontier
}

/// Token form of a forward path: the origin followed by `p o` pairs
pub(crate) fn path_tokens<'a>(entity: &'a str, path: &[&'a Triple], unify_anonymous: bool) -> Vec<&'a str> {
    let mut tokens = Vec::with_capacity(path.len() * 2 + 1);
    tokens.push(entity);
    for &triple in path {
        tokens.push(triple.predicate.as_ref());
        tokens.push(unify(&triple.object, unify_anonymous));
    }
    tokens
}

/// Duplicate-free forward random walks
///
/// Returns at most `walks_per_entity` distinct walks, each starting with
/// `entity` and holding at most `depth` hops. With `unify_anonymous` the
/// walks are collapsed again after blank nodes have been replaced.
pub fn random_walks_duplicate_free<S, R>(
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
    to_unique_walks(
        paths
            .iter()
            .map(|path| path_tokens(entity, path, unify_anonymous)),
    )
}

/// Forward random walks with duplicates allowed
///
/// Each of the `walks_per_entity` walks greedily follows one uniformly drawn
/// outgoing edge per hop and stops early at a node without successors.
/// Walks that could not leave the origin are discarded.
pub fn random_walks<S, R>(
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
    let mut walks = Vec::with_capacity(walks_per_entity);

    for _ in 0..walks_per_entity {
        let mut tokens = Vec::with_capacity(depth * 2 + 1);
        tokens.push(entity);
        let mut current = entity;

        for _ in 0..depth {
            let Some(triple) = draw(source.successors(current), rng) else {
                break;
            };
            tokens.push(triple.predicate.as_ref());
            tokens.push(unify(&triple.object, unify_anonymous));
            current = triple.object.as_ref();
        }

        if tokens.len() > 1 {
            walks.push(tokens);
        }
    }

    to_string_walks(walks)
}
