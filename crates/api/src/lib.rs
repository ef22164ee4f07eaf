//! PawsPort REST API client
//!
//! One async method per resource of the pet-care API. Failures come back as
//! [`ApiError`]; nothing is retried here, retry policy belongs to the caller.
//!
//! Pet updates can be made to fail on purpose through a [`FailurePolicy`], so
//! optimistic-update rollback paths get exercised outside of tests too.

pub mod error;
pub mod failure;
pub mod fetch;
pub mod options;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use pawsport_domain::{
    Booking, Client as PetClient, ClientId, Grooming, NewVaccination, Pet, PetId, PetPatch,
    Vaccination,
};

pub use crate::error::{ApiError, Result};
pub use crate::failure::{AlwaysFail, FailurePolicy, NeverFail, RandomFailure, ScriptedFailures};
use crate::fetch::Fetch;
pub use crate::options::{ApiOptions, DEFAULT_BASE_URL};

/// The operations the dashboard needs from the backend.
#[async_trait]
pub trait PetCareApi: Send + Sync {
    async fn list_clients(&self) -> Result<Vec<PetClient>>;

    async fn list_pets(&self, client_id: Option<ClientId>) -> Result<Vec<Pet>>;

    async fn get_pet(&self, id: PetId) -> Result<Pet>;

    async fn update_pet(&self, id: PetId, patch: &PetPatch) -> Result<Pet>;

    async fn list_vaccinations(&self, pet_id: PetId) -> Result<Vec<Vaccination>>;

    async fn add_vaccination(&self, vaccination: &NewVaccination) -> Result<Vaccination>;

    async fn list_grooming(&self, pet_id: PetId) -> Result<Vec<Grooming>>;

    async fn list_bookings(&self, pet_id: PetId) -> Result<Vec<Booking>>;
}

/// HTTP implementation of [`PetCareApi`]
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http_client: Client,
    options: ApiOptions,
    failure_policy: Arc<dyn FailurePolicy>,
}

impl ApiClient {
    /// Create a client with default options (simulated failures enabled).
    pub fn new(base_url: &str) -> Result<Self> {
        Self::new_with_options(base_url, ApiOptions::default())
    }

    pub fn new_with_options(base_url: &str, options: ApiOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;
        Self::with_http_client(base_url, options, http_client)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http_client(
        base_url: &str,
        options: ApiOptions,
        http_client: Client,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let failure_policy: Arc<dyn FailurePolicy> = if options.simulate_failures {
            Arc::new(RandomFailure::new(options.failure_rate))
        } else {
            Arc::new(NeverFail)
        };
        Ok(Self {
            base_url,
            http_client,
            options,
            failure_policy,
        })
    }

    /// Replace the failure policy derived from the options.
    pub fn with_failure_policy(mut self, policy: Arc<dyn FailurePolicy>) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn options(&self) -> &ApiOptions {
        &self.options
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn pause(latency: Option<Duration>) {
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    pub async fn list_clients(&self) -> Result<Vec<PetClient>> {
        Self::pause(self.options.read_latency).await;
        Fetch::get(&self.http_client, self.endpoint(&["clients"])?).execute().await
    }

    /// All pets, or only those owned by `client_id`.
    pub async fn list_pets(&self, client_id: Option<ClientId>) -> Result<Vec<Pet>> {
        Self::pause(self.options.read_latency).await;
        let mut req = Fetch::get(&self.http_client, self.endpoint(&["pets"])?);
        if let Some(client_id) = client_id {
            req = req.query("clientId", &client_id.to_string());
        }
        req.execute().await
    }

    pub async fn get_pet(&self, id: PetId) -> Result<Pet> {
        Self::pause(self.options.read_latency).await;
        Fetch::get(&self.http_client, self.endpoint(&["pets", id.to_string().as_str()])?)
            .execute()
            .await
    }

    /// `PATCH /pets/{id}` with the fields present in `patch`.
    ///
    /// Subject to the configured [`FailurePolicy`]; a simulated failure never
    /// reaches the network.
    pub async fn update_pet(&self, id: PetId, patch: &PetPatch) -> Result<Pet> {
        Self::pause(self.options.write_latency).await;
        if self.failure_policy.should_fail() {
            warn!("Simulating failure for update of pet {}", id);
            return Err(ApiError::simulated(self.failure_policy.rate()));
        }
        debug!("Updating pet {}", id);
        Fetch::patch(&self.http_client, self.endpoint(&["pets", id.to_string().as_str()])?)
            .json(patch)?
            .execute()
            .await
    }

    pub async fn list_vaccinations(&self, pet_id: PetId) -> Result<Vec<Vaccination>> {
        Self::pause(self.options.read_latency).await;
        Fetch::get(&self.http_client, self.endpoint(&["vaccinations"])?)
            .query("petId", &pet_id.to_string())
            .execute()
            .await
    }

    pub async fn add_vaccination(&self, vaccination: &NewVaccination) -> Result<Vaccination> {
        Self::pause(self.options.write_latency).await;
        Fetch::post(&self.http_client, self.endpoint(&["vaccinations"])?)
            .json(vaccination)?
            .execute()
            .await
    }

    pub async fn list_grooming(&self, pet_id: PetId) -> Result<Vec<Grooming>> {
        Self::pause(self.options.read_latency).await;
        Fetch::get(&self.http_client, self.endpoint(&["grooming"])?)
            .query("petId", &pet_id.to_string())
            .execute()
            .await
    }

    pub async fn list_bookings(&self, pet_id: PetId) -> Result<Vec<Booking>> {
        Self::pause(self.options.read_latency).await;
        Fetch::get(&self.http_client, self.endpoint(&["bookings"])?)
            .query("petId", &pet_id.to_string())
            .execute()
            .await
    }
}

#[async_trait]
impl PetCareApi for ApiClient {
    async fn list_clients(&self) -> Result<Vec<PetClient>> {
        ApiClient::list_clients(self).await
    }

    async fn list_pets(&self, client_id: Option<ClientId>) -> Result<Vec<Pet>> {
        ApiClient::list_pets(self, client_id).await
    }

    async fn get_pet(&self, id: PetId) -> Result<Pet> {
        ApiClient::get_pet(self, id).await
    }

    async fn update_pet(&self, id: PetId, patch: &PetPatch) -> Result<Pet> {
        ApiClient::update_pet(self, id, patch).await
    }

    async fn list_vaccinations(&self, pet_id: PetId) -> Result<Vec<Vaccination>> {
        ApiClient::list_vaccinations(self, pet_id).await
    }

    async fn add_vaccination(&self, vaccination: &NewVaccination) -> Result<Vaccination> {
        ApiClient::add_vaccination(self, vaccination).await
    }

    async fn list_grooming(&self, pet_id: PetId) -> Result<Vec<Grooming>> {
        ApiClient::list_grooming(self, pet_id).await
    }

    async fn list_bookings(&self, pet_id: PetId) -> Result<Vec<Booking>> {
        ApiClient::list_bookings(self, pet_id).await
    }
}
