//! Domain primitives, services and ports.
//!
//! Purpose: hold the property discovery logic independent of any transport
//! or storage. Everything that talks to the outside world does so through
//! the traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - FilterState / FilterPatch / FilterStore: search criteria.
//! - Property / PropertyId: listing records.
//! - query: compilation of filters into predicates.
//! - fetch: single-flight cache and per-view result feed.
//! - favorites: optimistic favorite toggling.
//! - slug: detail route segments.

pub mod error;
pub mod favorites;
pub mod fetch;
pub mod filters;
pub mod listing_submission;
pub mod ports;
pub mod property;
pub mod property_detail;
pub mod query;
pub mod slug;
pub mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::favorites::{FavoriteReconciler, FavoriteStatus};
pub use self::fetch::{DisplayMode, FetchCoordinator, FetchResult, FetchSubscription, ResultsFeed};
pub use self::filters::{
    DEFAULT_BATHROOM_RANGE, DEFAULT_BEDROOM_RANGE, DEFAULT_PRICE_RANGE, DEFAULT_SQUARE_FEET_RANGE,
    FilterPatch, FilterState, FilterStore, NumericRange,
};
pub use self::listing_submission::{
    ListingDraft, ListingSubmissionService, ListingValidationError, NewListing, SubmittedListing,
};
pub use self::property::{
    BuilderSummary, PLACEHOLDER_IMAGE, Property, PropertyId, PropertyIdValidationError,
};
pub use self::property_detail::PropertyDetailService;
pub use self::user::{UserId, UserIdValidationError};
