//! Client configuration.

use crate::poll::PollPolicy;

/// Client configuration.
///
/// Constructed once and passed explicitly to the client; there is no
/// ambient process-wide session state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the platform API.
    pub api_url: String,

    /// Poll policy for wait-style operations.
    pub poll: PollPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://platform.geoflow.io".to_string(),
            poll: PollPolicy::default(),
        }
    }
}

impl Config {
    /// Builder method to override the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Builder method to override the poll policy.
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}
