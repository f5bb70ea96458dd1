//! Object-storage location endpoint.
//!
//! Byte transfer is out of scope; the platform only reports where an
//! account's results live, and callers hand that location to their own
//! S3 tooling.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::ClientError;
use crate::http::HttpClient;

/// Where an account's workflow outputs are staged.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    /// Bucket holding the account's results.
    pub bucket: String,

    /// Account-specific prefix within the bucket.
    pub prefix: String,
}

impl StorageInfo {
    /// Full `s3://bucket/prefix` location string.
    pub fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.prefix)
    }
}

/// Client for the object-storage location endpoint.
pub struct StorageApi {
    http: Arc<HttpClient>,
}

impl StorageApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Fetch the account's storage location.
    pub async fn info(&self) -> Result<StorageInfo, ClientError> {
        self.http.get_json("/storage/v1/info").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;

    #[tokio::test]
    async fn test_info_builds_location() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/storage/v1/info")
            .with_status(200)
            .with_body(r#"{"bucket": "geoflow-results", "prefix": "acct-7f3a"}"#)
            .create_async()
            .await;

        let api = StorageApi::new(Arc::new(HttpClient::new(
            &server.url(),
            Arc::new(StaticToken::new("test-token")),
        )));
        let info = api.info().await.unwrap();
        assert_eq!(info.location(), "s3://geoflow-results/acct-7f3a");
    }
}
