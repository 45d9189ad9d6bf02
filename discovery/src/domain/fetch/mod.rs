//! Fetching listings for a filter state.
//!
//! [`FetchCoordinator`] owns the shared cache: one entry per compiled query,
//! each carrying a [`FetchResult`] that subscribers observe as it moves from
//! `Loading` to `Success` or `Error`. [`ResultsFeed`] is the per-view side:
//! it follows whichever filter state the view currently shows and drops
//! results that belong to a filter state it has since moved away from.

use std::sync::Arc;

use crate::domain::{Error, Property};

mod coordinator;
mod feed;

pub use coordinator::{FetchCoordinator, FetchSubscription};
pub use feed::{DisplayMode, ResultsFeed};

/// Status of a cached query.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// The remote call has not finished.
    Loading,
    /// Matching listings, shared by every subscriber of the entry.
    Success(Arc<Vec<Property>>),
    /// The call failed or the filters were rejected.
    Error(Error),
}

impl FetchResult {
    /// `true` once the entry has left `Loading`.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    /// Shared listing data, if the fetch succeeded.
    pub fn data(&self) -> Option<&Arc<Vec<Property>>> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Failure reason, if the fetch failed.
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests;
