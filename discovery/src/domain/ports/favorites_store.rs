//! Port for the remote favorites store.

use async_trait::async_trait;

use crate::domain::{PropertyId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by favorites store adapters.
    pub enum FavoritesStoreError {
        /// The store could not be reached.
        Connection => "favorites store connection failed",
        /// The store refused the read or write.
        Rejected => "favorites store rejected the request",
    }
}

/// Port for per-user favorite membership.
///
/// Adds and removes are idempotent from the caller's point of view: adding an
/// existing favorite or removing a missing one succeeds.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// List the properties `user_id` has favorited.
    async fn list(&self, user_id: &UserId) -> Result<Vec<PropertyId>, FavoritesStoreError>;

    /// Record `property_id` as a favorite of `user_id`.
    async fn add(
        &self,
        user_id: &UserId,
        property_id: &PropertyId,
    ) -> Result<(), FavoritesStoreError>;

    /// Remove `property_id` from the favorites of `user_id`.
    async fn remove(
        &self,
        user_id: &UserId,
        property_id: &PropertyId,
    ) -> Result<(), FavoritesStoreError>;
}

/// Fixture implementation that holds no favorites and accepts every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFavoritesStore;

#[async_trait]
impl FavoritesStore for FixtureFavoritesStore {
    async fn list(&self, _user_id: &UserId) -> Result<Vec<PropertyId>, FavoritesStoreError> {
        Ok(Vec::new())
    }

    async fn add(
        &self,
        _user_id: &UserId,
        _property_id: &PropertyId,
    ) -> Result<(), FavoritesStoreError> {
        Ok(())
    }

    async fn remove(
        &self,
        _user_id: &UserId,
        _property_id: &PropertyId,
    ) -> Result<(), FavoritesStoreError> {
        Ok(())
    }
}
