//! Catalog endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ClientError;
use crate::http::HttpClient;

/// A catalog record for an imagery acquisition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Catalog identifier of the acquisition.
    pub identifier: String,

    /// Record type (e.g. "Acquisition").
    #[serde(rename = "type", default)]
    pub record_type: Option<String>,

    /// Provider-reported properties (sensor, cloud cover, footprint, ...).
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

/// Client for the catalog endpoint.
pub struct CatalogApi {
    http: Arc<HttpClient>,
}

impl CatalogApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Fetch the catalog record for an acquisition.
    pub async fn record(&self, catalog_id: &str) -> Result<CatalogRecord, ClientError> {
        self.http
            .get_json(&format!("/catalog/v1/record/{catalog_id}"))
            .await
    }
}
