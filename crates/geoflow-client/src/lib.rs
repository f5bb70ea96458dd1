//! Geoflow platform client
//!
//! HTTP client library for a remote geospatial-imagery processing platform:
//! order satellite imagery, launch processing workflows, poll their status,
//! and locate results in object storage. The heavy lifting happens on the
//! platform; this crate shapes requests, validates the task/workflow graph
//! locally (see `geoflow-core`), and parses responses.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use geoflow_client::{Config, Geoflow, StaticToken};
//!
//! async fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let gf = Geoflow::new(Config::default(), Arc::new(StaticToken::new("token")));
//!
//!     let order = gf.ordering().order("1030010045539700").await?;
//!     let finished = gf
//!         .ordering()
//!         .wait_until_delivered(&[order], gf.poll_policy())
//!         .await?;
//!
//!     let location = finished[0].location.as_deref().unwrap_or_default();
//!     let workflow = gf
//!         .workflows()
//!         .stage_to_s3(location, "my_directory", &Default::default())
//!         .await?;
//!     let status = gf
//!         .workflows()
//!         .wait_until_complete(&workflow, gf.poll_policy())
//!         .await?;
//!
//!     println!("workflow finished: {:?}", status.state);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod ordering;
pub mod poll;
pub mod storage;
pub mod workflow;

use std::sync::Arc;

use crate::http::HttpClient;

pub use auth::{StaticToken, TokenProvider};
pub use catalog::{CatalogApi, CatalogRecord};
pub use config::Config;
pub use error::ClientError;
pub use ordering::{OrderStatus, OrderingApi};
pub use poll::{Backoff, PollPolicy};
pub use storage::{StorageApi, StorageInfo};
pub use workflow::{StageToS3Options, WorkflowApi, WorkflowEvent, WorkflowStatus};

/// Entry point to the platform.
///
/// Owns the shared HTTP transport and hands out per-endpoint sub-clients;
/// construct one per configuration and pass it by reference.
pub struct Geoflow {
    http: Arc<HttpClient>,
    poll: PollPolicy,
}

impl Geoflow {
    /// Build a client from explicit configuration and a token provider.
    pub fn new(config: Config, token: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: Arc::new(HttpClient::new(&config.api_url, token)),
            poll: config.poll,
        }
    }

    /// Convenience constructor: default configuration with a fixed token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(Config::default(), Arc::new(StaticToken::new(token)))
    }

    /// Imagery ordering endpoint.
    pub fn ordering(&self) -> OrderingApi {
        OrderingApi::new(self.http.clone())
    }

    /// Task registry and workflow execution endpoint.
    pub fn workflows(&self) -> WorkflowApi {
        WorkflowApi::new(self.http.clone())
    }

    /// Catalog endpoint.
    pub fn catalog(&self) -> CatalogApi {
        CatalogApi::new(self.http.clone())
    }

    /// Object-storage location endpoint.
    pub fn storage(&self) -> StorageApi {
        StorageApi::new(self.http.clone())
    }

    /// The configured poll policy for wait-style operations.
    pub fn poll_policy(&self) -> &PollPolicy {
        &self.poll
    }
}
