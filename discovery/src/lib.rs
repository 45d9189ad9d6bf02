//! Property discovery data layer.
//!
//! Filter state, query compilation, a single-flight fetch cache, slug
//! resolution and favorite reconciliation, with PostgREST and in-memory
//! adapters for the remote stores.

pub mod config;
pub mod domain;
pub mod outbound;
