//! PostgREST-backed favorites store.

use async_trait::async_trait;
use reqwest::Method;

use super::client::{HttpFailure, PostgrestClient};
use super::dto::{FavoriteInsertDto, FavoriteRowDto};
use crate::domain::ports::{FavoritesStore, FavoritesStoreError};
use crate::domain::{PropertyId, UserId};

const FAVORITES_TABLE: &str = "favorites";

fn map_failure(failure: HttpFailure) -> FavoritesStoreError {
    match failure {
        HttpFailure::Transport {
            message,
            timed_out: true,
        } => FavoritesStoreError::connection(format!("request timed out: {message}")),
        HttpFailure::Transport { message, .. } => FavoritesStoreError::connection(message),
        HttpFailure::Status { message, .. } | HttpFailure::Decode { message } => {
            FavoritesStoreError::rejected(message)
        }
    }
}

/// Favorites store backed by the `favorites (user_id, property_id)` table.
#[derive(Debug, Clone)]
pub struct PostgrestFavoritesStore {
    client: PostgrestClient,
}

impl PostgrestFavoritesStore {
    /// Wrap a configured client.
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FavoritesStore for PostgrestFavoritesStore {
    async fn list(&self, user_id: &UserId) -> Result<Vec<PropertyId>, FavoritesStoreError> {
        let builder = self
            .client
            .request(Method::GET, FAVORITES_TABLE)
            .map_err(map_failure)?
            .query(&[
                ("select", "property_id".to_owned()),
                ("user_id", format!("eq.{user_id}")),
            ]);
        let rows: Vec<FavoriteRowDto> = self
            .client
            .fetch_json(builder)
            .await
            .map_err(map_failure)?;
        rows.into_iter()
            .map(FavoriteRowDto::into_domain)
            .collect::<Result<_, _>>()
            .map_err(FavoritesStoreError::rejected)
    }

    async fn add(
        &self,
        user_id: &UserId,
        property_id: &PropertyId,
    ) -> Result<(), FavoritesStoreError> {
        let builder = self
            .client
            .request(Method::POST, FAVORITES_TABLE)
            .map_err(map_failure)?
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(&FavoriteInsertDto {
                user_id,
                property_id,
            });
        self.client.execute(builder).await.map_err(map_failure)
    }

    async fn remove(
        &self,
        user_id: &UserId,
        property_id: &PropertyId,
    ) -> Result<(), FavoritesStoreError> {
        let builder = self
            .client
            .request(Method::DELETE, FAVORITES_TABLE)
            .map_err(map_failure)?
            .query(&[
                ("user_id", format!("eq.{user_id}")),
                ("property_id", format!("eq.{property_id}")),
            ]);
        self.client.execute(builder).await.map_err(map_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::postgrest::client::status_failure;
    use reqwest::StatusCode;

    #[test]
    fn transport_failures_are_connection_errors() {
        let failure = HttpFailure::Transport {
            message: "dns".to_owned(),
            timed_out: false,
        };
        assert_eq!(map_failure(failure), FavoritesStoreError::connection("dns"));
    }

    #[test]
    fn status_failures_are_rejections() {
        let error = map_failure(status_failure(StatusCode::FORBIDDEN, b"denied"));
        assert_eq!(error, FavoritesStoreError::rejected("status 403: denied"));
    }
}
