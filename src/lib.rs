//! PawsPort dashboard client
//!
//! Client-side core of the PawsPort pet-care dashboard: the client/pet
//! directory, the pet profile editor with optimistic saves, history tabs,
//! photo management and transient notifications, all backed by the PawsPort
//! REST API.

pub mod cache;
pub mod config;
pub mod debounce;
pub mod directory;
pub mod error;
pub mod history;
pub mod photos;
pub mod profile;
pub mod toasts;

use log::info;
use std::sync::Arc;

use pawsport_api::{ApiClient, PetCareApi};
use pawsport_domain::{Clock, PetId, SystemClock};

use crate::cache::PetCache;
use crate::config::DashboardOptions;
use crate::debounce::{debounce, DebounceInput, Debounced};
use crate::directory::Directory;
use crate::error::Result;
use crate::history::PetHistory;
use crate::photos::PetPhotos;
use crate::profile::PetProfile;
use crate::toasts::Toasts;

pub use crate::error::Error;
pub use pawsport_api as api;
pub use pawsport_domain as domain;

/// The main entry point for the dashboard
///
/// Owns the API client, the pet cache and the notification service, and hands
/// out the components that share them. Call [`shutdown`](Self::shutdown)
/// when the dashboard goes away.
pub struct Pawsport {
    api: Arc<dyn PetCareApi>,
    cache: Arc<PetCache>,
    toasts: Toasts,
    clock: Arc<dyn Clock>,
    options: DashboardOptions,
}

impl Pawsport {
    /// Create a dashboard talking to the API at `base_url`
    ///
    /// # Example
    ///
    /// ```
    /// use pawsport::Pawsport;
    ///
    /// let dashboard = Pawsport::new("http://localhost:4000").unwrap();
    /// assert_eq!(dashboard.options().base_url, "http://localhost:4000");
    /// ```
    pub fn new(base_url: &str) -> Result<Self> {
        Self::new_with_options(DashboardOptions::default().with_base_url(base_url))
    }

    /// Create a dashboard with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use pawsport::{Pawsport, config::DashboardOptions};
    ///
    /// let options = DashboardOptions::default().with_simulated_failures(false);
    /// let dashboard = Pawsport::new_with_options(options).unwrap();
    /// assert!(!dashboard.options().api.simulate_failures);
    /// ```
    pub fn new_with_options(options: DashboardOptions) -> Result<Self> {
        let client = ApiClient::new_with_options(&options.base_url, options.api.clone())?;
        info!(
            "Dashboard using {} (simulated failures: {})",
            client.base_url(),
            options.api.simulate_failures
        );
        Ok(Self::with_api(Arc::new(client), options))
    }

    /// Create a dashboard configured from `PAWSPORT_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new_with_options(DashboardOptions::from_env()?)
    }

    /// Create a dashboard over any [`PetCareApi`] implementation
    pub fn with_api(api: Arc<dyn PetCareApi>, options: DashboardOptions) -> Self {
        Self {
            api,
            cache: Arc::new(PetCache::new()),
            toasts: Toasts::new(options.toast_ttl),
            clock: Arc::new(SystemClock),
            options,
        }
    }

    /// Replace the clock used for ages, date validation and due-soon flags
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    pub fn api(&self) -> Arc<dyn PetCareApi> {
        Arc::clone(&self.api)
    }

    pub fn cache(&self) -> Arc<PetCache> {
        Arc::clone(&self.cache)
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    /// Load every client and pet
    pub async fn directory(&self) -> Directory {
        Directory::load(self.api.as_ref(), self.cache()).await
    }

    /// Search box input, debounced by the configured interval
    pub fn search(&self) -> (DebounceInput<String>, Debounced<String>) {
        debounce(String::new(), self.options.search_debounce)
    }

    /// Edit controller for one pet. Call [`PetProfile::open`] before editing.
    pub fn pet_profile(&self, pet_id: PetId) -> PetProfile {
        PetProfile::new(
            pet_id,
            self.api(),
            self.cache(),
            self.toasts.clone(),
            Arc::clone(&self.clock),
        )
    }

    pub fn history(&self, pet_id: PetId) -> PetHistory {
        PetHistory::new(
            pet_id,
            self.api(),
            self.toasts.clone(),
            Arc::clone(&self.clock),
            self.options.due_soon_days,
        )
    }

    pub fn photos(&self, pet_id: PetId) -> PetPhotos {
        PetPhotos::new(pet_id, self.api(), self.cache(), self.toasts.clone())
    }

    /// Tear down the notification service, cancelling pending expiries.
    pub async fn shutdown(&self) {
        self.toasts.shutdown().await;
        info!("Dashboard shut down");
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::DashboardOptions;
    pub use crate::directory::{ClientEntry, Directory};
    pub use crate::error::Error;
    pub use crate::history::{BadgeVariant, PetHistory, SortDirection};
    pub use crate::photos::PetPhotos;
    pub use crate::profile::{EditState, PetProfile};
    pub use crate::toasts::{Toast, ToastKind, Toasts};
    pub use crate::Pawsport;
    pub use pawsport_domain::{PetField, PetPatch, Status};
}
