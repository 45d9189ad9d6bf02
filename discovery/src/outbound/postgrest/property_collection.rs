//! PostgREST-backed property collection.

use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use super::client::{HttpFailure, PostgrestClient};
use super::dto::{InsertPropertyDto, decode_rows};
use super::query_params::render_filters;
use crate::domain::ports::{PropertyCollection, PropertyCollectionError};
use crate::domain::query::CompiledQuery;
use crate::domain::{NewListing, Property, PropertyId};

const PROPERTIES_TABLE: &str = "properties";
const DETAIL_SELECT: &str = "*,builders(name,id)";

fn map_read_failure(failure: HttpFailure) -> PropertyCollectionError {
    match failure {
        HttpFailure::Transport {
            message,
            timed_out: true,
        } => PropertyCollectionError::connection(format!("request timed out: {message}")),
        HttpFailure::Transport { message, .. } => PropertyCollectionError::connection(message),
        HttpFailure::Status { message, .. } => PropertyCollectionError::query(message),
        HttpFailure::Decode { message } => PropertyCollectionError::decode(message),
    }
}

fn map_write_failure(failure: HttpFailure) -> PropertyCollectionError {
    match failure {
        HttpFailure::Status { status, message } if status.is_client_error() => {
            PropertyCollectionError::rejected(message)
        }
        other => map_read_failure(other),
    }
}

/// Property collection backed by the `properties` table.
#[derive(Debug, Clone)]
pub struct PostgrestPropertyCollection {
    client: PostgrestClient,
}

impl PostgrestPropertyCollection {
    /// Wrap a configured client.
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    async fn rows(
        &self,
        params: Vec<(String, String)>,
        select: &str,
    ) -> Result<Vec<Property>, PropertyCollectionError> {
        let builder = self
            .client
            .request(Method::GET, PROPERTIES_TABLE)
            .map_err(map_read_failure)?
            .query(&[("select", select)])
            .query(&params);
        let rows: Vec<serde_json::Value> = self
            .client
            .fetch_json(builder)
            .await
            .map_err(map_read_failure)?;
        Ok(decode_rows(rows))
    }
}

#[async_trait]
impl PropertyCollection for PostgrestPropertyCollection {
    async fn query(&self, query: &CompiledQuery) -> Result<Vec<Property>, PropertyCollectionError> {
        let params = render_filters(query);
        debug!(?params, "querying properties");
        self.rows(params, "*").await
    }

    async fn find_by_id(
        &self,
        id: &PropertyId,
    ) -> Result<Option<Property>, PropertyCollectionError> {
        let params = vec![("id".to_owned(), format!("eq.{id}"))];
        let rows = self.rows(params, DETAIL_SELECT).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, listing: &NewListing) -> Result<Property, PropertyCollectionError> {
        let builder = self
            .client
            .request(Method::POST, PROPERTIES_TABLE)
            .map_err(map_write_failure)?
            .header("Prefer", "return=representation")
            .json(&InsertPropertyDto::from(listing.fields()));
        let rows: Vec<serde_json::Value> = self
            .client
            .fetch_json(builder)
            .await
            .map_err(map_write_failure)?;
        decode_rows(rows)
            .into_iter()
            .next()
            .ok_or_else(|| PropertyCollectionError::decode("insert returned no representation"))
    }
}
