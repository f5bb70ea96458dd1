//! Bearer token seam.
//!
//! Token acquisition and refresh are delegated to external auth tooling;
//! the client only asks for a token to attach to each request.

use async_trait::async_trait;

use crate::error::ClientError;

/// Supplies the bearer token attached to every request.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a token valid for the next request.
    async fn token(&self) -> Result<String, ClientError>;
}

/// Token provider backed by a fixed, pre-acquired token.
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap an already-acquired bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String, ClientError> {
        Ok(self.0.clone())
    }
}
