//! Entity selection
//!
//! A generation run first decides which entities need walks:
//!
//! - [`StoreEntitySelector`]: every entity known to the triple source
//! - [`LightEntitySelector`]: an externally supplied allow-list file
//! - [`ContinuationEntitySelector`]: another selector minus the entities
//!   already covered by a previous, interrupted run
//!
//! The entity set is computed once per run.

pub mod continuation;
pub mod light;

pub use continuation::ContinuationEntitySelector;
pub use light::LightEntitySelector;

use crate::error::Result;
use crate::store::TripleSource;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Produces the set of entities a generation run must cover
pub trait EntitySelector: Send + Sync {
    /// Compute the entity set
    fn entities(&self) -> Result<HashSet<String>>;
}

/// Selects every subject and object of the triple source
pub struct StoreEntitySelector<S: TripleSource + ?Sized> {
    source: Arc<S>,
}

impl<S: TripleSource + ?Sized> StoreEntitySelector<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }
}

impl<S: TripleSource + ?Sized> EntitySelector for StoreEntitySelector<S> {
    fn entities(&self) -> Result<HashSet<String>> {
        let entities = self.source.entities();
        info!(entities = entities.len(), "Selected all entities of the triple source");
        Ok(entities)
    }
}

impl<T: EntitySelector + ?Sized> EntitySelector for Box<T> {
    fn entities(&self) -> Result<HashSet<String>> {
        (**self).entities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TripleStore;

    #[test]
    fn test_store_selector() {
        let mut store = TripleStore::new();
        store.insert("A", "p", "B");
        store.insert_datatype("C", "label", "text");

        let selector = StoreEntitySelector::new(Arc::new(store));
        let entities = selector.entities().unwrap();
        assert_eq!(
            entities,
            HashSet::from(["A".to_string(), "B".to_string(), "C".to_string()])
        );
    }

    #[test]
    fn test_boxed_selector() {
        let mut store = TripleStore::new();
        store.insert("A", "p", "B");
        let boxed: Box<dyn EntitySelector> = Box::new(StoreEntitySelector::new(Arc::new(store)));
        assert_eq!(boxed.entities().unwrap().len(), 2);
    }
}
