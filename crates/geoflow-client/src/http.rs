//! HTTP transport shared by the sub-clients.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::auth::TokenProvider;
use crate::error::ClientError;

/// HTTP client for the platform's REST endpoints.
///
/// Wraps one `reqwest::Client` plus the base URL and token provider; every
/// sub-client borrows the same instance.
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
    token: Arc<dyn TokenProvider>,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(base_url: &str, token: Arc<dyn TokenProvider>) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get JSON from an endpoint.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET request");

        let response = self.authorize(self.inner.get(&url)).await?.send().await?;
        Self::decode(response, path).await
    }

    /// Post a JSON payload and decode the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST request");

        let response = self
            .authorize(self.inner.post(&url))
            .await?
            .json(body)
            .send()
            .await?;
        Self::decode(response, path).await
    }

    /// Post with no payload, discarding the response body.
    pub async fn post_empty(&self, path: &str) -> Result<(), ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST request");

        let response = self.authorize(self.inner.post(&url)).await?.send().await?;
        Self::check(response, path).await.map(|_| ())
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.token().await?;
        Ok(request.bearer_auth(token))
    }

    async fn check(response: Response, path: &str) -> Result<Response, ClientError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ClientError> {
        Self::check(response, path)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use serde_json::Value;

    fn client(url: &str) -> HttpClient {
        HttpClient::new(url, Arc::new(StaticToken::new("test-token")))
    }

    #[tokio::test]
    async fn test_get_json_attaches_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/things/1")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 1}"#)
            .create_async()
            .await;

        let value: Value = client(&server.url()).get_json("/things/1").await.unwrap();
        assert_eq!(value["id"], 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_resource_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/things/2")
            .with_status(404)
            .create_async()
            .await;

        let err = client(&server.url())
            .get_json::<Value>("/things/2")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound(path) if path == "/things/2"));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/things/3")
            .with_status(503)
            .with_body("domain unavailable")
            .create_async()
            .await;

        let err = client(&server.url())
            .get_json::<Value>("/things/3")
            .await
            .unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "domain unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash_trimmed() {
        let http = HttpClient::new(
            "https://platform.geoflow.io/",
            Arc::new(StaticToken::new("t")),
        );
        assert_eq!(http.base_url(), "https://platform.geoflow.io");
    }
}
