//! Shared HTTP plumbing for PostgREST tables.
//!
//! Owns transport details only: URL building, auth headers, timeout and
//! status handling, and JSON decoding. Each adapter maps [`HttpFailure`] into
//! its own port error.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

/// Failure classes shared by every PostgREST adapter.
#[derive(Debug)]
pub(super) enum HttpFailure {
    /// The request never produced a response.
    Transport { message: String, timed_out: bool },
    /// The server answered with a non-success status.
    Status { status: StatusCode, message: String },
    /// The body could not be decoded.
    Decode { message: String },
}

impl std::fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport { message, .. }
            | Self::Status { message, .. }
            | Self::Decode { message } => f.write_str(message),
        }
    }
}

/// Connection details shared by the PostgREST adapters.
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl PostgrestClient {
    /// Build a client with an explicit request timeout.
    ///
    /// `base_url` is the REST root; a trailing slash is added when missing so
    /// table names join beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: with_trailing_slash(base_url),
            api_key,
        })
    }

    pub(super) fn table_url(&self, table: &str) -> Result<Url, HttpFailure> {
        self.base_url
            .join(table)
            .map_err(|error| HttpFailure::Transport {
                message: format!("invalid table URL for {table}: {error}"),
                timed_out: false,
            })
    }

    pub(super) fn request(&self, method: Method, table: &str) -> Result<RequestBuilder, HttpFailure> {
        let mut builder = self
            .http
            .request(method, self.table_url(table)?)
            .header(ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            builder = builder
                .header("apikey", key.as_str())
                .header(AUTHORIZATION, format!("Bearer {key}"));
        }
        Ok(builder)
    }

    /// Send and decode a JSON array response.
    pub(super) async fn fetch_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, HttpFailure> {
        let body = self.send(builder).await?;
        serde_json::from_slice(&body).map_err(|error| HttpFailure::Decode {
            message: format!("invalid PostgREST JSON payload: {error}"),
        })
    }

    /// Send and discard the body.
    pub(super) async fn execute(&self, builder: RequestBuilder) -> Result<(), HttpFailure> {
        self.send(builder).await.map(drop)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Vec<u8>, HttpFailure> {
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(status_failure(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn map_transport_error(error: reqwest::Error) -> HttpFailure {
    HttpFailure::Transport {
        timed_out: error.is_timeout(),
        message: error.to_string(),
    }
}

pub(super) fn status_failure(status: StatusCode, body: &[u8]) -> HttpFailure {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };
    HttpFailure::Status { status, message }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_LIMIT: usize = 160;

    let text = String::from_utf8_lossy(body);
    let mut preview = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Some((cut, _)) = preview.char_indices().nth(PREVIEW_LIMIT) {
        preview.truncate(cut);
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://db.example/rest/v1", "https://db.example/rest/v1/properties")]
    #[case("https://db.example/rest/v1/", "https://db.example/rest/v1/properties")]
    #[case("https://db.example", "https://db.example/properties")]
    fn tables_join_under_the_rest_root(#[case] base: &str, #[case] expected: &str) {
        let base = Url::parse(base).expect("valid base");
        let client =
            PostgrestClient::new(base, None, Duration::from_secs(1)).expect("client builds");
        let url = client.table_url("properties").expect("table url");
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn status_failures_carry_a_compact_body_preview() {
        let failure = status_failure(
            StatusCode::BAD_REQUEST,
            b"{\n  \"message\": \"column   missing\"\n}",
        );
        assert_eq!(
            failure.to_string(),
            "status 400: { \"message\": \"column missing\" }"
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let failure = status_failure(StatusCode::BAD_GATEWAY, body.as_bytes());
        let message = failure.to_string();
        assert!(message.ends_with("..."));
        assert_eq!(message.len(), "status 502: ".len() + 160 + 3);
    }

    #[test]
    fn empty_bodies_report_status_only() {
        let failure = status_failure(StatusCode::NOT_FOUND, b"");
        assert_eq!(failure.to_string(), "status 404");
    }
}
