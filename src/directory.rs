//! Client and pet listing with search and status filtering

use log::warn;
use std::sync::Arc;

use pawsport_api::PetCareApi;
use pawsport_domain::{Client, ClientId, Pet, PetId};

use crate::cache::PetCache;

/// A client together with the pets to show under it
#[derive(Debug, Clone, PartialEq)]
pub struct ClientEntry {
    pub client: Client,
    pub pets: Vec<Pet>,
}

/// Group `pets` under their owners, keeping the clients that match `search`.
///
/// A client matches when its name or email contains the search text, or when
/// any of its pets' names does (case-insensitive). Unless `include_inactive`
/// is set, inactive clients are dropped and only active pets are listed.
pub fn filter_directory(
    clients: &[Client],
    pets: &[Pet],
    search: &str,
    include_inactive: bool,
) -> Vec<ClientEntry> {
    let needle = search.to_lowercase();

    clients
        .iter()
        .filter_map(|client| {
            let owned: Vec<&Pet> = pets.iter().filter(|p| p.client_id == client.id).collect();

            let matches_client = client.name.to_lowercase().contains(&needle)
                || client.email.to_lowercase().contains(&needle);
            let matches_pet = owned.iter().any(|p| p.name.to_lowercase().contains(&needle));
            if !matches_client && !matches_pet {
                return None;
            }
            if !include_inactive && !client.status.is_active() {
                return None;
            }

            let visible = owned
                .into_iter()
                .filter(|p| include_inactive || p.status.is_active())
                .cloned()
                .collect();
            Some(ClientEntry {
                client: client.clone(),
                pets: visible,
            })
        })
        .collect()
}

/// The pet selected when a client row is clicked.
pub fn first_visible_pet(
    pets: &[Pet],
    client_id: ClientId,
    include_inactive: bool,
) -> Option<PetId> {
    pets.iter()
        .filter(|p| p.client_id == client_id)
        .find(|p| include_inactive || p.status.is_active())
        .map(|p| p.id)
}

/// Every client, plus the listed pets as held by the shared cache
///
/// Pet records are read from the cache on every call, so settled or rolled
/// back mutations show up here without reloading.
#[derive(Debug, Clone)]
pub struct Directory {
    pub clients: Vec<Client>,
    cache: Arc<PetCache>,
}

impl Directory {
    pub fn new(clients: Vec<Client>, cache: Arc<PetCache>) -> Self {
        Self { clients, cache }
    }

    /// Fetch clients and pets concurrently. A failed read leaves its half empty.
    pub async fn load(api: &dyn PetCareApi, cache: Arc<PetCache>) -> Self {
        let ticket = cache.begin_list_read();
        let (clients, pets) = tokio::join!(api.list_clients(), api.list_pets(None));
        let clients = clients.unwrap_or_else(|e| {
            warn!("Failed to load clients: {}", e);
            Vec::new()
        });
        let pets = pets.unwrap_or_else(|e| {
            warn!("Failed to load pets: {}", e);
            Vec::new()
        });
        cache.finish_list_read(ticket, pets).await;
        Self { clients, cache }
    }

    pub async fn pets(&self) -> Vec<Pet> {
        self.cache.listed().await
    }

    pub async fn view(&self, search: &str, include_inactive: bool) -> Vec<ClientEntry> {
        filter_directory(&self.clients, &self.pets().await, search, include_inactive)
    }

    pub async fn first_visible_pet(
        &self,
        client_id: ClientId,
        include_inactive: bool,
    ) -> Option<PetId> {
        first_visible_pet(&self.pets().await, client_id, include_inactive)
    }

    pub async fn pet(&self, pet_id: PetId) -> Option<Pet> {
        self.cache.get(pet_id).await
    }
}
