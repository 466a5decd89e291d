//! Mid walks
//!
//! A mid walk grows around its origin: each hop either prepends a
//! predecessor edge `(subject, predicate)` or appends a successor edge
//! `(predicate, object)`. The two sides keep independent cursors.
//!
//! Walks that never left the origin are discarded, so the entity appears
//! somewhere in every returned walk but not necessarily first.

use super::{draw, to_string_walks, to_unique_walks};
use crate::store::TripleSource;
use rand::prelude::*;
use std::collections::VecDeque;

/// How a hop picks between the predecessor and the successor side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SideChoice {
    /// Fair coin
    Uniform,
    /// Probability of the predecessor side is `|pred| / (|pred| + |succ|)`
    Weighted,
}

/// Sample one mid walk as tokens
///
/// With [`SideChoice::Uniform`] a side without candidates adds nothing for
/// that hop. With [`SideChoice::Weighted`] the walk ends as soon as both
/// sides are empty.
pub(crate) fn mid_walk_tokens<'a, S, R>(
    source: &'a S,
    entity: &'a str,
    depth: usize,
    choice: SideChoice,
    rng: &mut R,
) -> Vec<&'a str>
where
    S: TripleSource + ?Sized,
    R: Rng + ?Sized,
{
    let mut walk: VecDeque<&'a str> = VecDeque::with_capacity(depth * 2 + 1);
    walk.push_back(entity);

    let mut predecessor_cursor = entity;
    let mut successor_cursor = entity;

    for _ in 0..depth {
        let go_back = match choice {
            SideChoice::Uniform => rng.random_bool(0.5),
            SideChoice::Weighted => {
                let preds = source.predecessors(predecessor_cursor).len();
                let succs = source.successors(successor_cursor).len();
                if preds == 0 && succs == 0 {
                    break;
                }
                rng.random_bool(preds as f64 / (preds + succs) as f64)
            }
        };

        if go_back {
            if let Some(triple) = draw(source.predecessors(predecessor_cursor), rng) {
                walk.push_front(triple.predicate.as_ref());
                walk.push_front(triple.subject.as_ref());
                predecessor_cursor = triple.subject.as_ref();
            }
        } else if let Some(triple) = draw(source.successors(successor_cursor), rng) {
            walk.push_back(triple.predicate.as_ref());
            walk.push_back(triple.object.as_ref());
            successor_cursor = triple.object.as_ref();
        }
    }

    walk.into()
}

/// Sample `walks_per_entity` mid walks, dropping those of length one
pub(crate) fn mid_walk_batch<'a, S, R>(
    source: &'a S,
    entity: &'a str,
    walks_per_entity: usize,
    depth: usize,
    choice: SideChoice,
    rng: &mut R,
) -> Vec<Vec<&'a str>>
where
    S: TripleSource + ?Sized,
    R: Rng + ?Sized,
{
    (0..walks_per_entity)
        .map(|_| mid_walk_tokens(source, entity, depth, choice, rng))
        .filter(|walk| walk.len() > 1)
        .collect()
}

/// Mid walks with a fair predecessor/successor coin; duplicates allowed
pub fn mid_walks<S, R>(
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
    to_string_walks(mid_walk_batch(
        source,
        entity,
        walks_per_entity,
        depth,
        SideChoice::Uniform,
        rng,
    ))
}

/// Mid walks collapsed into a set; may return fewer than requested
pub fn mid_walks_duplicate_free<S, R>(
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
    to_unique_walks(mid_walk_batch(
        source,
        entity,
        walks_per_entity,
        depth,
        SideChoice::Uniform,
        rng,
    ))
}

/// Mid walks whose side choice is weighted by the candidate counts
pub fn weighted_mid_walks<S, R>(
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
    to_string_walks(mid_walk_batch(
        source,
        entity,
        walks_per_entity,
        depth,
        SideChoice::Weighted,
        rng,
    ))
}

/// Weighted mid walks collapsed into a set
pub fn weighted_mid_walks_duplicate_free<S, R>(
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
    to_unique_walks(mid_walk_batch(
        source,
        entity,
        walks_per_entity,
        depth,
        SideChoice::Weighted,
        rng,
    ))
}
