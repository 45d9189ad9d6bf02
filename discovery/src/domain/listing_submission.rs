//! Listing submission.
//!
//! A [`ListingDraft`] is what the submission form collects. It is validated
//! into a [`NewListing`] before anything is sent to the remote collection;
//! image upload happens elsewhere and only its resulting URL reaches here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ports::{PropertyCollection, PropertyCollectionError};
use crate::domain::slug::property_slug;
use crate::domain::{Error, Property, PropertyId};

/// Validation errors raised by [`ListingDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingValidationError {
    /// The title was blank.
    #[error("title must not be empty")]
    BlankTitle,
    /// The description was blank.
    #[error("description must not be empty")]
    BlankDescription,
    /// The location was blank.
    #[error("location must not be empty")]
    BlankLocation,
    /// The price was zero.
    #[error("price must be at least 1")]
    ZeroPrice,
    /// The bathroom count was negative or not a number.
    #[error("bathrooms must be a non-negative number")]
    InvalidBathrooms,
}

/// Raw listing fields as entered on the submission form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListingDraft {
    /// Listing headline.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Asking price.
    pub price: u64,
    /// Location text.
    pub location: String,
    /// Bedroom count.
    pub bedrooms: Option<u32>,
    /// Bathroom count.
    pub bathrooms: Option<f64>,
    /// Interior area.
    pub square_feet: Option<u64>,
    /// Home type category.
    pub home_type: Option<String>,
    /// Construction status category.
    pub construction_status: Option<String>,
    /// Ownership type category.
    pub ownership_type: Option<String>,
    /// Quick move-in availability.
    pub quick_move_in: bool,
    /// URL of an already uploaded image.
    pub image_url: Option<String>,
}

fn trimmed_required(
    value: &str,
    error: ListingValidationError,
) -> Result<String, ListingValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(error)
    } else {
        Ok(trimmed.to_owned())
    }
}

fn trimmed_optional(value: Option<String>) -> Option<String> {
    value
        .map(|inner| inner.trim().to_owned())
        .filter(|inner| !inner.is_empty())
}

impl ListingDraft {
    /// Validate the draft, trimming text fields.
    ///
    /// # Examples
    /// ```
    /// use discovery::domain::{ListingDraft, ListingValidationError};
    ///
    /// let err = ListingDraft::default().validate().expect_err("blank draft");
    /// assert_eq!(err, ListingValidationError::BlankTitle);
    /// ```
    pub fn validate(self) -> Result<NewListing, ListingValidationError> {
        let title = trimmed_required(&self.title, ListingValidationError::BlankTitle)?;
        let description =
            trimmed_required(&self.description, ListingValidationError::BlankDescription)?;
        let location = trimmed_required(&self.location, ListingValidationError::BlankLocation)?;
        if self.price == 0 {
            return Err(ListingValidationError::ZeroPrice);
        }
        if self
            .bathrooms
            .is_some_and(|value| !value.is_finite() || value < 0.0)
        {
            return Err(ListingValidationError::InvalidBathrooms);
        }

        Ok(NewListing(ListingDraft {
            title,
            description,
            location,
            home_type: trimmed_optional(self.home_type),
            construction_status: trimmed_optional(self.construction_status),
            ownership_type: trimmed_optional(self.ownership_type),
            image_url: trimmed_optional(self.image_url),
            ..self
        }))
    }
}

/// A listing that passed validation and is ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing(ListingDraft);

impl NewListing {
    /// Borrow the validated fields.
    pub fn fields(&self) -> &ListingDraft {
        &self.0
    }

    /// Materialise the listing under `id`, as a store that echoes writes would.
    pub fn into_property(self, id: PropertyId) -> Property {
        let ListingDraft {
            title,
            description,
            price,
            location,
            bedrooms,
            bathrooms,
            square_feet,
            home_type,
            construction_status,
            ownership_type,
            quick_move_in,
            image_url,
        } = self.0;
        Property {
            description: Some(description),
            bedrooms,
            bathrooms,
            square_feet,
            home_type,
            construction_status,
            ownership_type,
            quick_move_in,
            image_url,
            ..Property::new(id, title, price, location)
        }
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedListing {
    /// The listing as stored.
    pub property: Property,
    /// Detail page path, `/properties/{slug}`.
    pub detail_path: String,
}

fn map_collection_error(error: PropertyCollectionError) -> Error {
    match error {
        PropertyCollectionError::Rejected { message } => {
            Error::invalid_request(format!("listing rejected: {message}"))
        }
        other => Error::query_failure(format!("listing could not be saved: {other}")),
    }
}

/// Creates listings through the property collection port.
pub struct ListingSubmissionService<C> {
    collection: Arc<C>,
}

impl<C> ListingSubmissionService<C> {
    /// Create a service over the given collection.
    pub fn new(collection: Arc<C>) -> Self {
        Self { collection }
    }
}

impl<C> ListingSubmissionService<C>
where
    C: PropertyCollection,
{
    /// Validate and insert a draft.
    ///
    /// Invalid drafts fail with `InvalidRequest` before any remote call.
    pub async fn submit(&self, draft: ListingDraft) -> Result<SubmittedListing, Error> {
        let listing = draft
            .validate()
            .map_err(|err| Error::invalid_request(format!("invalid listing: {err}")))?;

        let property = self
            .collection
            .insert(&listing)
            .await
            .map_err(map_collection_error)?;

        let detail_path = format!("/properties/{}", property_slug(&property.id, &property.title));
        info!(property_id = %property.id, %detail_path, "listing submitted");
        Ok(SubmittedListing {
            property,
            detail_path,
        })
    }
}
