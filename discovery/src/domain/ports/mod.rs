//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the remote listing collection, the favorites store, the identity
//! capability). Each port exposes strongly typed errors so adapters map
//! their failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod favorites_store;
mod identity;
mod property_collection;

#[cfg(test)]
pub use favorites_store::MockFavoritesStore;
pub use favorites_store::{FavoritesStore, FavoritesStoreError, FixtureFavoritesStore};
#[cfg(test)]
pub use identity::MockIdentityProvider;
pub use identity::{IdentityProvider, SessionIdentity};
#[cfg(test)]
pub use property_collection::MockPropertyCollection;
pub use property_collection::{
    FixturePropertyCollection, PropertyCollection, PropertyCollectionError,
};
