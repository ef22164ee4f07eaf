//! Configuration options for the API client

use std::time::Duration;

use crate::failure::DEFAULT_FAILURE_RATE;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiOptions {
    /// Whether update calls randomly fail
    pub simulate_failures: bool,

    /// Probability of a simulated update failure
    pub failure_rate: f64,

    /// Artificial delay before every read
    pub read_latency: Option<Duration>,

    /// Artificial delay before every write
    pub write_latency: Option<Duration>,

    /// The request timeout
    pub request_timeout: Option<Duration>,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            simulate_failures: true,
            failure_rate: DEFAULT_FAILURE_RATE,
            read_latency: None,
            write_latency: None,
            request_timeout: None,
        }
    }
}

impl ApiOptions {
    pub fn with_simulate_failures(mut self, value: bool) -> Self {
        self.simulate_failures = value;
        self
    }

    pub fn with_failure_rate(mut self, value: f64) -> Self {
        self.failure_rate = value;
        self
    }

    pub fn with_read_latency(mut self, value: Option<Duration>) -> Self {
        self.read_latency = value;
        self
    }

    pub fn with_write_latency(mut self, value: Option<Duration>) -> Self {
        self.write_latency = value;
        self
    }

    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }
}
