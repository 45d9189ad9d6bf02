//! Favorite membership for the signed-in user.
//!
//! Toggles are optimistic: the local set flips first, the remote store is
//! asked second, and the flip is undone if the store refuses. Each toggle is
//! a two-phase [`PendingToggle`] that either commits or rolls back, including
//! when the caller abandons the toggle future mid-flight.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::domain::ports::{FavoritesStore, FavoritesStoreError, IdentityProvider};
use crate::domain::{Error, PropertyId, UserId};

/// Favorite state of one property for the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteStatus {
    /// No user is signed in, or their favorites are not loaded yet.
    Unknown,
    /// The property is a favorite.
    Favorited,
    /// The property is not a favorite.
    NotFavorited,
}

impl From<bool> for FavoriteStatus {
    fn from(value: bool) -> Self {
        if value {
            Self::Favorited
        } else {
            Self::NotFavorited
        }
    }
}

fn map_store_error(error: FavoritesStoreError) -> Error {
    Error::favorite_sync_failure(format!("favorites store failed: {error}"))
}

#[derive(Debug, Default)]
struct FavoriteLedger {
    user: Option<UserId>,
    loaded: bool,
    members: HashSet<PropertyId>,
    in_flight: HashSet<PropertyId>,
}

impl FavoriteLedger {
    /// Reset when the signed-in identity has changed since the last access.
    fn sync_user(&mut self, user: Option<&UserId>) {
        if self.user.as_ref() != user {
            debug!("signed-in user changed; discarding cached favorites");
            *self = Self {
                user: user.cloned(),
                ..Self::default()
            };
        }
    }

    fn status(&self, property: &PropertyId) -> FavoriteStatus {
        if self.loaded {
            self.members.contains(property).into()
        } else {
            FavoriteStatus::Unknown
        }
    }
}

/// Tracks and reconciles the current user's favorites.
pub struct FavoriteReconciler<I, S> {
    identity: Arc<I>,
    store: Arc<S>,
    ledger: Mutex<FavoriteLedger>,
}

impl<I, S> FavoriteReconciler<I, S>
where
    I: IdentityProvider,
    S: FavoritesStore,
{
    /// Create a reconciler with nothing loaded.
    pub fn new(identity: Arc<I>, store: Arc<S>) -> Self {
        Self {
            identity,
            store,
            ledger: Mutex::new(FavoriteLedger::default()),
        }
    }

    fn ledger_for(&self, user: Option<&UserId>) -> MutexGuard<'_, FavoriteLedger> {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger.sync_user(user);
        ledger
    }

    fn require_user(&self) -> Result<UserId, Error> {
        self.identity
            .current_user()
            .ok_or_else(|| Error::unauthenticated("sign in to manage favorites"))
    }

    /// Current status of `property`, without any remote call.
    pub fn status(&self, property: &PropertyId) -> FavoriteStatus {
        let user = self.identity.current_user();
        self.ledger_for(user.as_ref()).status(property)
    }

    /// Load the signed-in user's favorites unless already loaded.
    pub async fn load(&self) -> Result<(), Error> {
        let user = self.require_user()?;
        self.load_for(&user).await
    }

    async fn load_for(&self, user: &UserId) -> Result<(), Error> {
        if self.ledger_for(Some(user)).loaded {
            return Ok(());
        }

        let favorites = self.store.list(user).await.map_err(map_store_error)?;

        let mut ledger = self.ledger_for(self.identity.current_user().as_ref());
        if ledger.user.as_ref() == Some(user) && !ledger.loaded {
            debug!(%user, count = favorites.len(), "loaded favorites");
            ledger.members = favorites.into_iter().collect();
            ledger.loaded = true;
        }
        Ok(())
    }

    /// Flip the favorite state of `property` and return the new status.
    ///
    /// # Errors
    /// - `Unauthenticated` when nobody is signed in; nothing changes.
    /// - `Conflict` when a toggle for the same property is still in flight.
    /// - `FavoriteSyncFailure` when the store refuses; the flip is undone.
    pub async fn toggle(&self, property: &PropertyId) -> Result<FavoriteStatus, Error> {
        let user = self.require_user()?;
        self.load_for(&user).await?;

        let pending = self.begin(user, property)?;
        let outcome = if pending.was_favorited {
            self.store.remove(&pending.user, property).await
        } else {
            self.store.add(&pending.user, property).await
        };

        match outcome {
            Ok(()) => Ok(pending.commit()),
            Err(error) => {
                let error = map_store_error(error);
                pending.rollback(&error);
                Err(error)
            }
        }
    }

    fn begin(&self, user: UserId, property: &PropertyId) -> Result<PendingToggle<'_>, Error> {
        let mut ledger = self.ledger_for(Some(&user));
        if ledger.in_flight.contains(property) {
            return Err(Error::conflict(format!(
                "a favorite change for property {property} is still in progress"
            )));
        }

        let was_favorited = ledger.members.contains(property);
        if was_favorited {
            ledger.members.remove(property);
        } else {
            ledger.members.insert(property.clone());
        }
        ledger.in_flight.insert(property.clone());

        Ok(PendingToggle {
            ledger: &self.ledger,
            user,
            property: property.clone(),
            was_favorited,
            settled: false,
        })
    }
}

/// Tentative local flip awaiting remote confirmation.
///
/// Dropped without [`commit`](Self::commit) it restores the prior state.
struct PendingToggle<'a> {
    ledger: &'a Mutex<FavoriteLedger>,
    user: UserId,
    property: PropertyId,
    was_favorited: bool,
    settled: bool,
}

impl PendingToggle<'_> {
    fn lock(&self) -> MutexGuard<'_, FavoriteLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit(mut self) -> FavoriteStatus {
        self.settled = true;
        let mut ledger = self.lock();
        ledger.in_flight.remove(&self.property);
        FavoriteStatus::from(!self.was_favorited)
    }

    fn rollback(mut self, reason: &Error) {
        warn!(
            user = %self.user,
            property = %self.property,
            %reason,
            "rolling back favorite toggle"
        );
        self.restore();
        self.settled = true;
    }

    fn restore(&self) {
        let mut ledger = self.lock();
        // The ledger was reset if a different user signed in meanwhile.
        if ledger.user.as_ref() != Some(&self.user) {
            return;
        }
        ledger.in_flight.remove(&self.property);
        if self.was_favorited {
            ledger.members.insert(self.property.clone());
        } else {
            ledger.members.remove(&self.property);
        }
    }
}

impl Drop for PendingToggle<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(property = %self.property, "favorite toggle abandoned; rolling back");
            self.restore();
        }
    }
}
