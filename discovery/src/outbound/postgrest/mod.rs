//! PostgREST outbound adapters.
//!
//! Thin `reqwest` implementations of the property collection and favorites
//! store ports against a PostgREST endpoint (the REST root, for example
//! `https://project.supabase.co/rest/v1/`).

mod client;
mod dto;
mod favorites_store;
mod property_collection;
mod query_params;

pub use client::PostgrestClient;
pub use favorites_store::PostgrestFavoritesStore;
pub use property_collection::PostgrestPropertyCollection;
pub use query_params::render_filters;
