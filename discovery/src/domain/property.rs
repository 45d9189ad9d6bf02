//! Property listing records as read from the remote collection.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image shown when a listing carries no usable image reference.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Validation errors returned by [`PropertyId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyIdValidationError {
    /// The identifier was empty.
    #[error("property id must not be empty")]
    Empty,
    /// The identifier was not a UUID.
    #[error("property id must be a valid UUID")]
    Invalid,
}

/// Canonical property identifier.
///
/// Stored as a parsed UUID alongside the text it was created from, so the
/// identifier handed to the remote store keeps the caller's casing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyId(Uuid, String);

impl PropertyId {
    /// Validate and construct a [`PropertyId`].
    pub fn new(id: impl AsRef<str>) -> Result<Self, PropertyIdValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`PropertyId`].
    pub fn random() -> Self {
        let uuid = Uuid::new_v4();
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, PropertyIdValidationError> {
        if id.is_empty() {
            return Err(PropertyIdValidationError::Empty);
        }
        if id.trim() != id {
            return Err(PropertyIdValidationError::Invalid);
        }
        let parsed = Uuid::parse_str(&id).map_err(|_| PropertyIdValidationError::Invalid)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

// Identity is the UUID; the preserved text only affects display.
impl PartialEq for PropertyId {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for PropertyId {}

impl Hash for PropertyId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl AsRef<str> for PropertyId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PropertyId> for String {
    fn from(value: PropertyId) -> Self {
        let PropertyId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for PropertyId {
    type Error = PropertyIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Builder (developer) attached to a listing on the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderSummary {
    /// Remote builder identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A property listing.
///
/// The core never mutates listings; it only filters and displays them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Canonical identifier.
    pub id: PropertyId,
    /// Listing headline.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Asking price in whole currency units.
    pub price: u64,
    /// Location text, commonly `"Street, City"`.
    pub location: String,
    /// Bedroom count.
    pub bedrooms: Option<u32>,
    /// Bathroom count; half baths are fractional.
    pub bathrooms: Option<f64>,
    /// Interior area.
    pub square_feet: Option<u64>,
    /// Home type category, e.g. `"Single Family"`.
    pub home_type: Option<String>,
    /// Construction status category, e.g. `"Under Construction"`.
    pub construction_status: Option<String>,
    /// Ownership type category, e.g. `"Freehold"`.
    pub ownership_type: Option<String>,
    /// Whether the home is available for quick move-in.
    pub quick_move_in: bool,
    /// Comma-delimited image references.
    pub image_url: Option<String>,
    /// Floor plan image reference.
    pub floorplan_url: Option<String>,
    /// Floor plan availability label.
    pub floorplan_status: Option<String>,
    /// Builder details, present on detail lookups.
    pub builder: Option<BuilderSummary>,
}

impl Property {
    /// Split the delimited image reference into individual entries.
    ///
    /// Entries are trimmed and blanks dropped. When nothing usable remains the
    /// placeholder image is returned so galleries always have a first frame.
    ///
    /// # Examples
    /// ```
    /// use discovery::domain::{Property, PropertyId, PLACEHOLDER_IMAGE};
    ///
    /// let mut property = Property::new(PropertyId::random(), "Villa", 1, "Miami");
    /// assert_eq!(property.images(), vec![PLACEHOLDER_IMAGE.to_owned()]);
    /// property.image_url = Some("a.jpg, b.jpg".to_owned());
    /// assert_eq!(property.images(), vec!["a.jpg".to_owned(), "b.jpg".to_owned()]);
    /// ```
    pub fn images(&self) -> Vec<String> {
        let images: Vec<String> = self
            .image_url
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_owned)
            .collect();
        if images.is_empty() {
            vec![PLACEHOLDER_IMAGE.to_owned()]
        } else {
            images
        }
    }

    /// Minimal listing with every optional attribute unset.
    pub fn new(
        id: PropertyId,
        title: impl Into<String>,
        price: u64,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            price,
            location: location.into(),
            bedrooms: None,
            bathrooms: None,
            square_feet: None,
            home_type: None,
            construction_status: None,
            ownership_type: None,
            quick_move_in: false,
            image_url: None,
            floorplan_url: None,
            floorplan_status: None,
            builder: None,
        }
    }
}
