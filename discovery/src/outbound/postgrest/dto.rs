//! Row DTOs for the `properties` and `favorites` tables.
//!
//! Adapters decode into these first, then map to domain records in one pass.
//! Unknown columns are ignored so schema additions do not break reads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::{BuilderSummary, ListingDraft, Property, PropertyId, UserId};

#[derive(Debug, Deserialize)]
pub(super) struct PropertyRowDto {
    pub(super) id: String,
    pub(super) title: String,
    #[serde(default)]
    pub(super) description: Option<String>,
    pub(super) price: f64,
    pub(super) location: String,
    #[serde(default)]
    pub(super) bedrooms: Option<u32>,
    #[serde(default)]
    pub(super) bathrooms: Option<f64>,
    #[serde(default)]
    pub(super) square_feet: Option<u64>,
    #[serde(default)]
    pub(super) home_type: Option<String>,
    #[serde(default)]
    pub(super) construction_status: Option<String>,
    #[serde(default)]
    pub(super) ownership_type: Option<String>,
    #[serde(default)]
    pub(super) quick_move_in: Option<bool>,
    #[serde(default)]
    pub(super) image_url: Option<String>,
    #[serde(default)]
    pub(super) floorplan_url: Option<String>,
    #[serde(default)]
    pub(super) floorplan_status: Option<String>,
    #[serde(default)]
    pub(super) builders: Option<BuilderDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BuilderDto {
    pub(super) id: Value,
    pub(super) name: String,
}

impl PropertyRowDto {
    pub(super) fn into_domain(self) -> Result<Property, String> {
        let id = PropertyId::new(&self.id)
            .map_err(|error| format!("property {:?} has an invalid id: {error}", self.id))?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!("property {id} has an invalid price {}", self.price));
        }

        Ok(Property {
            id,
            title: self.title,
            description: self.description,
            price: self.price.round() as u64,
            location: self.location,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            square_feet: self.square_feet,
            home_type: self.home_type,
            construction_status: self.construction_status,
            ownership_type: self.ownership_type,
            quick_move_in: self.quick_move_in.unwrap_or(false),
            image_url: self.image_url,
            floorplan_url: self.floorplan_url,
            floorplan_status: self.floorplan_status,
            builder: self.builders.map(BuilderDto::into_domain),
        })
    }
}

impl BuilderDto {
    fn into_domain(self) -> BuilderSummary {
        let id = match self.id {
            Value::String(text) => text,
            other => other.to_string(),
        };
        BuilderSummary {
            id,
            name: self.name,
        }
    }
}

fn decode_row(row: Value) -> Result<Property, String> {
    serde_json::from_value::<PropertyRowDto>(row)
        .map_err(|error| format!("property row has an unexpected shape: {error}"))?
        .into_domain()
}

/// Map raw rows to properties, skipping and logging any that cannot be read.
pub(super) fn decode_rows(rows: Vec<Value>) -> Vec<Property> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match decode_row(row) {
            Ok(property) => Some(property),
            Err(error) => {
                warn!(index, %error, "skipping undecodable property row");
                None
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub(super) struct InsertPropertyDto<'a> {
    title: &'a str,
    description: &'a str,
    price: u64,
    location: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bathrooms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    square_feet: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    home_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    construction_status: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ownership_type: Option<&'a str>,
    quick_move_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
}

impl<'a> From<&'a ListingDraft> for InsertPropertyDto<'a> {
    fn from(draft: &'a ListingDraft) -> Self {
        Self {
            title: &draft.title,
            description: &draft.description,
            price: draft.price,
            location: &draft.location,
            bedrooms: draft.bedrooms,
            bathrooms: draft.bathrooms,
            square_feet: draft.square_feet,
            home_type: draft.home_type.as_deref(),
            construction_status: draft.construction_status.as_deref(),
            ownership_type: draft.ownership_type.as_deref(),
            quick_move_in: draft.quick_move_in,
            image_url: draft.image_url.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct FavoriteRowDto {
    pub(super) property_id: String,
}

impl FavoriteRowDto {
    pub(super) fn into_domain(self) -> Result<PropertyId, String> {
        PropertyId::new(&self.property_id).map_err(|error| {
            format!(
                "favorite row has an invalid property id {:?}: {error}",
                self.property_id
            )
        })
    }
}

#[derive(Debug, Serialize)]
pub(super) struct FavoriteInsertDto<'a> {
    pub(super) user_id: &'a UserId,
    pub(super) property_id: &'a PropertyId,
}
