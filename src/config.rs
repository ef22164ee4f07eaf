//! Configuration options for the dashboard

use std::time::Duration;
use url::Url;

use pawsport_api::{ApiOptions, DEFAULT_BASE_URL};

use crate::error::{Error, Result};

pub const ENV_API_URL: &str = "PAWSPORT_API_URL";
pub const ENV_DISABLE_SIM_FAILURE: &str = "PAWSPORT_DISABLE_SIM_FAILURE";
pub const ENV_FAILURE_RATE: &str = "PAWSPORT_FAILURE_RATE";

/// Configuration options for the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    /// Base URL of the pet-care API
    pub base_url: String,

    /// Options passed through to the API client
    pub api: ApiOptions,

    /// Quiet period before a search string is applied
    pub search_debounce: Duration,

    /// Lifetime of a notification
    pub toast_ttl: Duration,

    /// A vaccination is "due soon" this many days ahead
    pub due_soon_days: i64,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api: ApiOptions::default(),
            search_debounce: Duration::from_millis(400),
            toast_ttl: Duration::from_secs(5),
            due_soon_days: 30,
        }
    }
}

impl DashboardOptions {
    /// Read options from the process environment.
    ///
    /// - `PAWSPORT_API_URL`: API base URL
    /// - `PAWSPORT_DISABLE_SIM_FAILURE`: `true`/`1` turns simulated update failures off
    /// - `PAWSPORT_FAILURE_RATE`: probability of a simulated failure, `0..=1`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            Url::parse(url.trim()).map_err(|e| Error::Config(format!("{}: {}", ENV_API_URL, e)))?;
            options.base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_DISABLE_SIM_FAILURE) {
            let disabled = parse_flag(&raw).ok_or_else(|| {
                Error::Config(format!(
                    "{}: expected true or false, got {:?}",
                    ENV_DISABLE_SIM_FAILURE, raw
                ))
            })?;
            options.api.simulate_failures = !disabled;
        }

        if let Some(raw) = lookup(ENV_FAILURE_RATE) {
            let rate: f64 = raw
                .trim()
                .parse()
                .map_err(|_| {
                    Error::Config(format!("{}: not a number: {:?}", ENV_FAILURE_RATE, raw))
                })?;
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::Config(format!(
                    "{} must be within 0 and 1, got {}",
                    ENV_FAILURE_RATE, rate
                )));
            }
            options.api.failure_rate = rate;
        }

        Ok(options)
    }

    pub fn with_base_url(mut self, value: &str) -> Self {
        self.base_url = value.to_string();
        self
    }

    pub fn with_api_options(mut self, value: ApiOptions) -> Self {
        self.api = value;
        self
    }

    /// Turn simulated update failures on or off
    pub fn with_simulated_failures(mut self, value: bool) -> Self {
        self.api.simulate_failures = value;
        self
    }

    pub fn with_search_debounce(mut self, value: Duration) -> Self {
        self.search_debounce = value;
        self
    }

    pub fn with_toast_ttl(mut self, value: Duration) -> Self {
        self.toast_ttl = value;
        self
    }

    pub fn with_due_soon_days(mut self, value: i64) -> Self {
        self.due_soon_days = value;
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}
