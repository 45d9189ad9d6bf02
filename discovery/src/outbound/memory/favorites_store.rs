//! In-memory favorites store.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{FavoritesStore, FavoritesStoreError};
use crate::domain::{PropertyId, UserId};

#[derive(Debug, Default)]
struct State {
    favorites: HashMap<UserId, HashSet<PropertyId>>,
    failing_writes: Option<FavoritesStoreError>,
}

/// Favorites store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryFavoritesStore {
    state: Mutex<State>,
}

impl InMemoryFavoritesStore {
    /// Make every add and remove fail with `error` until cleared.
    pub fn fail_writes(&self, error: FavoritesStoreError) {
        self.state().failing_writes = Some(error);
    }

    /// Accept writes again.
    pub fn accept_writes(&self) {
        self.state().failing_writes = None;
    }

    /// Whether the store records `property_id` as a favorite of `user_id`.
    pub fn contains(&self, user_id: &UserId, property_id: &PropertyId) -> bool {
        self.state()
            .favorites
            .get(user_id)
            .is_some_and(|set| set.contains(property_id))
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(
        &self,
        user_id: &UserId,
        apply: impl FnOnce(&mut HashSet<PropertyId>),
    ) -> Result<(), FavoritesStoreError> {
        let mut state = self.state();
        if let Some(error) = &state.failing_writes {
            return Err(error.clone());
        }
        apply(state.favorites.entry(user_id.clone()).or_default());
        Ok(())
    }
}

#[async_trait]
impl FavoritesStore for InMemoryFavoritesStore {
    async fn list(&self, user_id: &UserId) -> Result<Vec<PropertyId>, FavoritesStoreError> {
        Ok(self
            .state()
            .favorites
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn add(
        &self,
        user_id: &UserId,
        property_id: &PropertyId,
    ) -> Result<(), FavoritesStoreError> {
        self.write(user_id, |set| {
            set.insert(property_id.clone());
        })
    }

    async fn remove(
        &self,
        user_id: &UserId,
        property_id: &PropertyId,
    ) -> Result<(), FavoritesStoreError> {
        self.write(user_id, |set| {
            set.remove(property_id);
        })
    }
}
