//! Port for the remote property collection.
//!
//! The collection accepts compiled predicate sets and returns matching
//! listings. The core never performs storage I/O itself; adapters own the
//! wire format and map their failures into [`PropertyCollectionError`].

use async_trait::async_trait;

use crate::domain::query::CompiledQuery;
use crate::domain::{NewListing, Property, PropertyId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by property collection adapters.
    pub enum PropertyCollectionError {
        /// The collection could not be reached.
        Connection => "property collection connection failed",
        /// The collection refused or failed the query.
        Query => "property collection query failed",
        /// The collection answered with a payload that could not be decoded.
        Decode => "property collection payload could not be decoded",
        /// The collection refused a write.
        Rejected => "property collection rejected the write",
    }
}

/// Port for reading and creating listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyCollection: Send + Sync {
    /// Return every listing accepted by all clauses of `query`.
    async fn query(&self, query: &CompiledQuery) -> Result<Vec<Property>, PropertyCollectionError>;

    /// Fetch one listing, including its builder summary.
    ///
    /// Returns `None` when no listing has this identifier.
    async fn find_by_id(
        &self,
        id: &PropertyId,
    ) -> Result<Option<Property>, PropertyCollectionError>;

    /// Store a new listing and return it as persisted.
    async fn insert(&self, listing: &NewListing) -> Result<Property, PropertyCollectionError>;
}

/// Fixture implementation for tests that do not exercise listing reads.
///
/// Queries return nothing, lookups miss, and inserts echo the listing back
/// under a fresh identifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePropertyCollection;

#[async_trait]
impl PropertyCollection for FixturePropertyCollection {
    async fn query(&self, _query: &CompiledQuery) -> Result<Vec<Property>, PropertyCollectionError> {
        Ok(Vec::new())
    }

    async fn find_by_id(
        &self,
        _id: &PropertyId,
    ) -> Result<Option<Property>, PropertyCollectionError> {
        Ok(None)
    }

    async fn insert(&self, listing: &NewListing) -> Result<Property, PropertyCollectionError> {
        Ok(listing.clone().into_property(PropertyId::random()))
    }
}
