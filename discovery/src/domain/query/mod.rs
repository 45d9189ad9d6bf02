//! Declarative predicates understood by the remote property collection.
//!
//! A [`CompiledQuery`] is an ordered list of [`Clause`]s derived from a
//! [`FilterState`](crate::domain::FilterState) by [`compile`]. Equal filter
//! states always compile to equal queries, which is what lets the fetch
//! cache key entries by query identity.
//!
//! Adapters either render the clauses into their own wire format (see the
//! PostgREST adapter) or evaluate them directly with
//! [`CompiledQuery::matches`].

use std::fmt;

use sha2::{Digest, Sha256};

use crate::domain::Property;

mod compiler;

pub use compiler::{FilterValidationError, compile, validate_filters};

/// Property columns a clause can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Free-text location.
    Location,
    /// Asking price.
    Price,
    /// Bedroom count.
    Bedrooms,
    /// Bathroom count.
    Bathrooms,
    /// Interior area.
    SquareFeet,
    /// Home type category.
    HomeType,
    /// Construction status category.
    ConstructionStatus,
    /// Ownership type category.
    OwnershipType,
    /// Quick move-in flag.
    QuickMoveIn,
}

impl Field {
    /// Column name in the remote collection.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Price => "price",
            Self::Bedrooms => "bedrooms",
            Self::Bathrooms => "bathrooms",
            Self::SquareFeet => "square_feet",
            Self::HomeType => "home_type",
            Self::ConstructionStatus => "construction_status",
            Self::OwnershipType => "ownership_type",
            Self::QuickMoveIn => "quick_move_in",
        }
    }

    fn numeric_value(self, property: &Property) -> Option<f64> {
        match self {
            Self::Price => Some(property.price as f64),
            Self::Bedrooms => property.bedrooms.map(f64::from),
            Self::Bathrooms => property.bathrooms,
            Self::SquareFeet => property.square_feet.map(|value| value as f64),
            _ => None,
        }
    }

    fn text_value(self, property: &Property) -> Option<&str> {
        match self {
            Self::Location => Some(property.location.as_str()),
            Self::HomeType => property.home_type.as_deref(),
            Self::ConstructionStatus => property.construction_status.as_deref(),
            Self::OwnershipType => property.ownership_type.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Case-insensitive literal text pattern.
///
/// Needles never contain the `*` or `%` wildcard characters; the compiler
/// strips them, so every adapter treats the needle as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextPattern {
    /// The needle appears anywhere.
    Contains(String),
    /// The needle appears immediately followed by a comma (`"City, State"`).
    BeforeComma(String),
}

impl TextPattern {
    /// Borrow the needle.
    pub fn needle(&self) -> &str {
        match self {
            Self::Contains(needle) | Self::BeforeComma(needle) => needle.as_str(),
        }
    }

    /// Evaluate the pattern against `haystack`, ignoring case.
    pub fn matches(&self, haystack: &str) -> bool {
        let haystack = haystack.to_lowercase();
        let needle = self.needle().to_lowercase();
        match self {
            Self::Contains(_) => haystack.contains(&needle),
            Self::BeforeComma(_) => haystack.contains(&format!("{needle},")),
        }
    }
}

impl fmt::Display for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains(needle) => write!(f, "contains({needle:?})"),
            Self::BeforeComma(needle) => write!(f, "before_comma({needle:?})"),
        }
    }
}

/// Right-hand side of an equality clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClauseValue {
    /// Exact text.
    Text(String),
    /// Boolean flag.
    Bool(bool),
}

impl fmt::Display for ClauseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => write!(f, "{value:?}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// A single predicate over one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Clause {
    /// The field matches at least one of the patterns.
    TextMatch {
        /// Constrained field.
        field: Field,
        /// Alternatives combined with OR.
        patterns: Vec<TextPattern>,
    },
    /// Inclusive lower bound.
    AtLeast {
        /// Constrained field.
        field: Field,
        /// Bound value.
        value: u64,
    },
    /// Inclusive upper bound.
    AtMost {
        /// Constrained field.
        field: Field,
        /// Bound value.
        value: u64,
    },
    /// Exact equality.
    Equals {
        /// Constrained field.
        field: Field,
        /// Required value.
        value: ClauseValue,
    },
}

impl Clause {
    /// Field this clause constrains.
    pub fn field(&self) -> Field {
        match self {
            Self::TextMatch { field, .. }
            | Self::AtLeast { field, .. }
            | Self::AtMost { field, .. }
            | Self::Equals { field, .. } => *field,
        }
    }

    /// Evaluate the clause against a record.
    ///
    /// Absent values never satisfy a clause, mirroring SQL `NULL`
    /// comparison semantics in the remote store.
    pub fn matches(&self, property: &Property) -> bool {
        match self {
            Self::TextMatch { field, patterns } => field
                .text_value(property)
                .is_some_and(|text| patterns.iter().any(|pattern| pattern.matches(text))),
            Self::AtLeast { field, value } => field
                .numeric_value(property)
                .is_some_and(|actual| actual >= *value as f64),
            Self::AtMost { field, value } => field
                .numeric_value(property)
                .is_some_and(|actual| actual <= *value as f64),
            Self::Equals {
                field: Field::QuickMoveIn,
                value: ClauseValue::Bool(expected),
            } => property.quick_move_in == *expected,
            Self::Equals {
                field,
                value: ClauseValue::Text(expected),
            } => field.text_value(property) == Some(expected.as_str()),
            Self::Equals { .. } => false,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextMatch { field, patterns } => {
                write!(f, "{field}~")?;
                for (index, pattern) in patterns.iter().enumerate() {
                    if index > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{pattern}")?;
                }
                Ok(())
            }
            Self::AtLeast { field, value } => write!(f, "{field}>={value}"),
            Self::AtMost { field, value } => write!(f, "{field}<={value}"),
            Self::Equals { field, value } => write!(f, "{field}={value}"),
        }
    }
}

/// Ordered predicate set compiled from a filter state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CompiledQuery {
    clauses: Vec<Clause>,
}

impl CompiledQuery {
    /// Wrap an already ordered clause list.
    pub fn from_clauses(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// Borrow the clauses in order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// `true` when every clause accepts the record.
    pub fn matches(&self, property: &Property) -> bool {
        self.clauses.iter().all(|clause| clause.matches(property))
    }

    /// SHA-256 hex digest of the canonical rendering.
    ///
    /// Stable across processes, so it doubles as a log correlation key for
    /// cache entries.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.to_string().as_bytes()))
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, clause) in self.clauses.iter().enumerate() {
            if index > 0 {
                f.write_str("&")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}
