//! In-memory property collection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::ports::{PropertyCollection, PropertyCollectionError};
use crate::domain::query::CompiledQuery;
use crate::domain::{NewListing, Property, PropertyId};

/// Property collection held in memory.
#[derive(Debug, Default)]
pub struct InMemoryPropertyCollection {
    properties: RwLock<Vec<Property>>,
    queries: AtomicUsize,
    next_failure: Mutex<Option<PropertyCollectionError>>,
}

impl InMemoryPropertyCollection {
    /// Seed the collection.
    pub fn with_properties(properties: Vec<Property>) -> Self {
        Self {
            properties: RwLock::new(properties),
            ..Self::default()
        }
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: PropertyCollectionError) {
        *self.failure() = Some(error);
    }

    /// Number of `query` calls received so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn failure(&self) -> MutexGuard<'_, Option<PropertyCollectionError>> {
        self.next_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_failure(&self) -> Result<(), PropertyCollectionError> {
        self.failure().take().map_or(Ok(()), Err)
    }
}

#[async_trait]
impl PropertyCollection for InMemoryPropertyCollection {
    async fn query(&self, query: &CompiledQuery) -> Result<Vec<Property>, PropertyCollectionError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let properties = self
            .properties
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(properties
            .iter()
            .filter(|property| query.matches(property))
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        id: &PropertyId,
    ) -> Result<Option<Property>, PropertyCollectionError> {
        self.check_failure()?;
        let properties = self
            .properties
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(properties.iter().find(|property| &property.id == id).cloned())
    }

    async fn insert(&self, listing: &NewListing) -> Result<Property, PropertyCollectionError> {
        self.check_failure()?;
        let property = listing.clone().into_property(PropertyId::random());
        self.properties
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(property.clone());
        Ok(property)
    }
}
