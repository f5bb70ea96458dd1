//! Imagery ordering endpoint.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use geoflow_core::{OrderId, OrderState};

use crate::error::ClientError;
use crate::http::HttpClient;
use crate::poll::PollPolicy;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderRequest<'a> {
    catalog_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    order_id: OrderId,
}

/// Status of an imagery order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
    /// Order identifier.
    pub order_id: OrderId,

    /// Object-storage location of the delivered imagery, once delivered.
    #[serde(default)]
    pub location: Option<String>,

    /// Current order state.
    pub state: OrderState,
}

/// Client for the imagery ordering endpoint.
pub struct OrderingApi {
    http: Arc<HttpClient>,
}

impl OrderingApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Order imagery by catalog identifier.
    pub async fn order(&self, catalog_id: &str) -> Result<OrderId, ClientError> {
        debug!(catalog_id, "Placing imagery order");
        let response: OrderResponse = self
            .http
            .post_json("/ordering/v1/orders", &OrderRequest { catalog_id })
            .await?;
        info!(order_id = %response.order_id, catalog_id, "Order placed");
        Ok(response.order_id)
    }

    /// Current status of an order.
    pub async fn status(&self, id: &OrderId) -> Result<OrderStatus, ClientError> {
        self.http
            .get_json(&format!("/ordering/v1/orders/{id}"))
            .await
    }

    /// Poll a set of orders under the given policy until every one reaches
    /// a terminal state, removing finished ids from the pending set each
    /// round.
    ///
    /// Returns the terminal statuses in completion order; callers check
    /// [`OrderState::is_delivered`] per entry, since a terminal order may
    /// also have failed.
    pub async fn wait_until_delivered(
        &self,
        ids: &[OrderId],
        policy: &PollPolicy,
    ) -> Result<Vec<OrderStatus>, ClientError> {
        let mut backoff = policy.backoff();
        let mut pending: Vec<OrderId> = ids.to_vec();
        let mut finished = Vec::with_capacity(ids.len());

        loop {
            let mut still_pending = Vec::new();
            for id in pending {
                let status = self.status(&id).await?;
                if status.state.is_terminal() {
                    info!(order_id = %id, state = ?status.state, "Order finished");
                    finished.push(status);
                } else {
                    debug!(order_id = %id, state = ?status.state, "Order still pending");
                    still_pending.push(id);
                }
            }
            pending = still_pending;

            if pending.is_empty() {
                return Ok(finished);
            }
            backoff.wait().await?;
        }
    }
}
