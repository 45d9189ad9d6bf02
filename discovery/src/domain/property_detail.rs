//! Detail page lookup.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{PropertyCollection, PropertyCollectionError};
use crate::domain::slug::resolve;
use crate::domain::{Error, Property};

fn map_collection_error(error: PropertyCollectionError) -> Error {
    Error::query_failure(format!("property lookup failed: {error}"))
}

/// Resolves detail-page route segments to listings.
pub struct PropertyDetailService<C> {
    collection: Arc<C>,
}

impl<C> PropertyDetailService<C> {
    /// Create a service over the given collection.
    pub fn new(collection: Arc<C>) -> Self {
        Self { collection }
    }
}

impl<C> PropertyDetailService<C>
where
    C: PropertyCollection,
{
    /// Load the listing a route segment names.
    ///
    /// A segment without a leading identifier fails with `NotFound` and never
    /// reaches the collection; so does an identifier with no matching record.
    pub async fn view(&self, segment: &str) -> Result<Property, Error> {
        let Some(id) = resolve(segment) else {
            debug!(segment, "route segment has no property identifier");
            return Err(Error::not_found(format!("no property at {segment:?}")));
        };

        self.collection
            .find_by_id(&id)
            .await
            .map_err(map_collection_error)?
            .ok_or_else(|| Error::not_found(format!("property {id} not found")))
    }
}
