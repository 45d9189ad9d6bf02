//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **postgrest**: `reqwest` adapters for a PostgREST endpoint
//! - **memory**: in-process adapters for tests and local runs
//!
//! Adapters are thin translators between domain types and their backing
//! representation. They contain no business logic.

pub mod memory;
pub mod postgrest;
