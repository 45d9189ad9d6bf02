//! In-process adapters.
//!
//! The property collection evaluates compiled queries with
//! [`CompiledQuery::matches`](crate::domain::query::CompiledQuery::matches),
//! so it answers exactly as the remote store would for the same clauses.
//! Both adapters count calls and can be primed to fail.

mod favorites_store;
mod property_collection;

pub use favorites_store::InMemoryFavoritesStore;
pub use property_collection::InMemoryPropertyCollection;
