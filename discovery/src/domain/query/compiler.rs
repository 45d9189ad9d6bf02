//! Filter state to predicate compilation.

use serde_json::json;
use tracing::debug;

use super::{Clause, ClauseValue, CompiledQuery, Field, TextPattern};
use crate::domain::{Error, FilterState, NumericRange};

/// Errors raised when a filter state cannot be sent to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterValidationError {
    /// A range's lower bound exceeds its upper bound.
    #[error("{field} range is inverted: min {min} exceeds max {max}")]
    InvertedRange {
        /// Offending field.
        field: Field,
        /// Supplied lower bound.
        min: u64,
        /// Supplied upper bound.
        max: u64,
    },
}

impl From<FilterValidationError> for Error {
    fn from(value: FilterValidationError) -> Self {
        let details = match &value {
            FilterValidationError::InvertedRange { field, min, max } => json!({
                "field": field.column(),
                "min": min,
                "max": max,
                "code": "inverted_range",
            }),
        };
        Error::invalid_request(value.to_string()).with_details(details)
    }
}

fn ranges(filters: &FilterState) -> [(Field, NumericRange); 4] {
    [
        (Field::Price, filters.price),
        (Field::Bedrooms, filters.bedrooms),
        (Field::Bathrooms, filters.bathrooms),
        (Field::SquareFeet, filters.square_feet),
    ]
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Free text with wildcard characters removed, or `None` when nothing is left.
fn needle(value: &str) -> Option<String> {
    let literal: String = value.chars().filter(|ch| !matches!(ch, '*' | '%')).collect();
    non_blank(&literal).map(str::to_owned)
}

/// Check that every range is ordered.
///
/// # Examples
/// ```
/// use discovery::domain::FilterState;
/// use discovery::domain::query::validate_filters;
///
/// assert!(validate_filters(&FilterState::default()).is_ok());
/// ```
pub fn validate_filters(filters: &FilterState) -> Result<(), FilterValidationError> {
    match ranges(filters)
        .into_iter()
        .find(|(_, range)| !range.is_ordered())
    {
        Some((field, range)) => Err(FilterValidationError::InvertedRange {
            field,
            min: range.min,
            max: range.max,
        }),
        None => Ok(()),
    }
}

/// Compile a filter state into its predicate set.
///
/// Clause order is fixed: location, city, the four ranges (lower bound then
/// upper bound), the categorical equalities, then quick move-in. Blank text
/// and unset options contribute nothing; ranges always contribute both
/// bounds, even at their defaults.
pub fn compile(filters: &FilterState) -> CompiledQuery {
    let mut clauses = Vec::with_capacity(14);

    if let Some(location) = needle(&filters.location) {
        debug!(%location, "applying location filter");
        clauses.push(Clause::TextMatch {
            field: Field::Location,
            patterns: vec![TextPattern::Contains(location)],
        });
    }

    // Heuristic kept from the listing page: the city appears anywhere, or
    // ahead of a comma as in "City, State".
    if let Some(city) = needle(&filters.city) {
        debug!(%city, "applying city filter");
        clauses.push(Clause::TextMatch {
            field: Field::Location,
            patterns: vec![
                TextPattern::Contains(city.clone()),
                TextPattern::BeforeComma(city),
            ],
        });
    }

    for (field, range) in ranges(filters) {
        clauses.push(Clause::AtLeast {
            field,
            value: range.min,
        });
        clauses.push(Clause::AtMost {
            field,
            value: range.max,
        });
    }

    let categories = [
        (Field::HomeType, filters.home_type.as_deref()),
        (Field::ConstructionStatus, filters.construction_status.as_deref()),
        (Field::OwnershipType, filters.ownership_type.as_deref()),
    ];
    for (field, value) in categories {
        if let Some(value) = value.and_then(non_blank) {
            debug!(%field, value, "applying category filter");
            clauses.push(Clause::Equals {
                field,
                value: ClauseValue::Text(value.to_owned()),
            });
        }
    }

    if filters.quick_move_in {
        clauses.push(Clause::Equals {
            field: Field::QuickMoveIn,
            value: ClauseValue::Bool(true),
        });
    }

    CompiledQuery::from_clauses(clauses)
}
