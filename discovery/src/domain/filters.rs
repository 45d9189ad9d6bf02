//! Search criteria for the listing page.
//!
//! [`FilterState`] is an immutable value; [`FilterStore`] owns the current
//! one and derives replacements from [`FilterPatch`]es. Nothing here touches
//! the network or validates ranges: an inverted range is stored as given and
//! rejected later by [`crate::domain::query::validate_filters`].

use serde::{Deserialize, Serialize};

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumericRange {
    /// Lower bound.
    pub min: u64,
    /// Upper bound.
    pub max: u64,
}

impl NumericRange {
    /// Construct a range without checking the bounds' order.
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// `true` when `min <= max`.
    pub const fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// Default price range.
pub const DEFAULT_PRICE_RANGE: NumericRange = NumericRange::new(0, 5_000_000);
/// Default bedroom range.
pub const DEFAULT_BEDROOM_RANGE: NumericRange = NumericRange::new(1, 7);
/// Default bathroom range.
pub const DEFAULT_BATHROOM_RANGE: NumericRange = NumericRange::new(1, 5);
/// Default square footage range.
pub const DEFAULT_SQUARE_FEET_RANGE: NumericRange = NumericRange::new(500, 10_000);

/// Complete set of user-chosen search criteria.
///
/// Identity is structural: two states with equal fields are the same search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Substring matched anywhere in the location text.
    pub location: String,
    /// City matched as a prefix or after a comma in the location text.
    pub city: String,
    /// Price bounds.
    pub price: NumericRange,
    /// Bedroom bounds.
    pub bedrooms: NumericRange,
    /// Bathroom bounds.
    pub bathrooms: NumericRange,
    /// Square footage bounds.
    pub square_feet: NumericRange,
    /// Required home type.
    pub home_type: Option<String>,
    /// Required construction status.
    pub construction_status: Option<String>,
    /// Required ownership type.
    pub ownership_type: Option<String>,
    /// Restrict to quick move-in homes.
    pub quick_move_in: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            location: String::new(),
            city: String::new(),
            price: DEFAULT_PRICE_RANGE,
            bedrooms: DEFAULT_BEDROOM_RANGE,
            bathrooms: DEFAULT_BATHROOM_RANGE,
            square_feet: DEFAULT_SQUARE_FEET_RANGE,
            home_type: None,
            construction_status: None,
            ownership_type: None,
            quick_move_in: false,
        }
    }
}

/// Partial update applied over a [`FilterState`].
///
/// `None` leaves the field untouched. Categorical fields take
/// `Some(None)` to clear a previous choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    /// Replacement location text.
    pub location: Option<String>,
    /// Replacement city text.
    pub city: Option<String>,
    /// Replacement price range.
    pub price: Option<NumericRange>,
    /// Replacement bedroom range.
    pub bedrooms: Option<NumericRange>,
    /// Replacement bathroom range.
    pub bathrooms: Option<NumericRange>,
    /// Replacement square footage range.
    pub square_feet: Option<NumericRange>,
    /// Replacement home type.
    pub home_type: Option<Option<String>>,
    /// Replacement construction status.
    pub construction_status: Option<Option<String>>,
    /// Replacement ownership type.
    pub ownership_type: Option<Option<String>>,
    /// Replacement quick move-in flag.
    pub quick_move_in: Option<bool>,
}

impl FilterPatch {
    /// Set the location text.
    pub fn location(mut self, value: impl Into<String>) -> Self {
        self.location = Some(value.into());
        self
    }

    /// Set the city text.
    pub fn city(mut self, value: impl Into<String>) -> Self {
        self.city = Some(value.into());
        self
    }

    /// Set the price range.
    pub fn price(mut self, min: u64, max: u64) -> Self {
        self.price = Some(NumericRange::new(min, max));
        self
    }

    /// Set the bedroom range.
    pub fn bedrooms(mut self, min: u64, max: u64) -> Self {
        self.bedrooms = Some(NumericRange::new(min, max));
        self
    }

    /// Set the bathroom range.
    pub fn bathrooms(mut self, min: u64, max: u64) -> Self {
        self.bathrooms = Some(NumericRange::new(min, max));
        self
    }

    /// Set the square footage range.
    pub fn square_feet(mut self, min: u64, max: u64) -> Self {
        self.square_feet = Some(NumericRange::new(min, max));
        self
    }

    /// Choose or clear the home type.
    pub fn home_type(mut self, value: Option<String>) -> Self {
        self.home_type = Some(value);
        self
    }

    /// Choose or clear the construction status.
    pub fn construction_status(mut self, value: Option<String>) -> Self {
        self.construction_status = Some(value);
        self
    }

    /// Choose or clear the ownership type.
    pub fn ownership_type(mut self, value: Option<String>) -> Self {
        self.ownership_type = Some(value);
        self
    }

    /// Set the quick move-in flag.
    pub fn quick_move_in(mut self, value: bool) -> Self {
        self.quick_move_in = Some(value);
        self
    }

    /// Produce a new state with this patch merged over `base`.
    pub fn apply_to(self, base: &FilterState) -> FilterState {
        let base = base.clone();
        FilterState {
            location: self.location.unwrap_or(base.location),
            city: self.city.unwrap_or(base.city),
            price: self.price.unwrap_or(base.price),
            bedrooms: self.bedrooms.unwrap_or(base.bedrooms),
            bathrooms: self.bathrooms.unwrap_or(base.bathrooms),
            square_feet: self.square_feet.unwrap_or(base.square_feet),
            home_type: self.home_type.unwrap_or(base.home_type),
            construction_status: self.construction_status.unwrap_or(base.construction_status),
            ownership_type: self.ownership_type.unwrap_or(base.ownership_type),
            quick_move_in: self.quick_move_in.unwrap_or(base.quick_move_in),
        }
    }
}

/// Owner of the current [`FilterState`].
///
/// Passed explicitly to whichever component needs it; there is no ambient
/// global filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStore {
    current: FilterState,
}

impl FilterStore {
    /// Start from the given state.
    pub fn new(initial: FilterState) -> Self {
        Self { current: initial }
    }

    /// Borrow the current state.
    pub fn current(&self) -> &FilterState {
        &self.current
    }

    /// Merge `patch` over the current state and return the new state.
    pub fn update(&mut self, patch: FilterPatch) -> FilterState {
        self.current = patch.apply_to(&self.current);
        self.current.clone()
    }

    /// Restore the wide-open defaults and return them.
    pub fn reset(&mut self) -> FilterState {
        self.current = FilterState::default();
        self.current.clone()
    }
}
