//! Canonical pet records
//!
//! The cache is the single source of truth for displayed pets. It is written
//! only by fetch responses and by the optimistic update / rollback sequence.
//! Every write is stamped with a sequence number; a read response is dropped
//! when something newer has already been written for the same pet, so a slow,
//! stale read can never clobber fresher state.
//!
//! The directory listing reads through the same entries, so a listing that
//! was requested before a mutation settled never resurrects the old record.

use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::RwLock;

use pawsport_api::PetCareApi;
use pawsport_domain::{Pet, PetId, PetPatch};

use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct Entry {
    pet: Option<Pet>,
    /// Sequence number of the write that produced `pet`
    written: u64,
}

/// Handle for a read started with [`PetCache::begin_read`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTicket {
    pub pet_id: PetId,
    seq: u64,
}

/// Handle for a listing started with [`PetCache::begin_list_read`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListTicket {
    seq: u64,
}

/// The pre-update record, restored verbatim on rollback
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub pet_id: PetId,
    previous: Pet,
}

impl Snapshot {
    pub fn previous(&self) -> &Pet {
        &self.previous
    }
}

#[derive(Debug, Default)]
pub struct PetCache {
    entries: RwLock<HashMap<PetId, Entry>>,
    next_seq: AtomicU64,
    updating: Mutex<HashSet<PetId>>,
    /// Pet ids in the order of the last listing response
    listing: RwLock<Vec<PetId>>,
}

impl PetCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub async fn get(&self, pet_id: PetId) -> Option<Pet> {
        self.entries.read().await.get(&pet_id).and_then(|e| e.pet.clone())
    }

    /// Register a read of `pet_id`; its response must be handed to
    /// [`finish_read`](Self::finish_read).
    pub fn begin_read(&self, pet_id: PetId) -> ReadTicket {
        ReadTicket {
            pet_id,
            seq: self.next_seq(),
        }
    }

    /// Store a read response unless a newer read or write already landed.
    /// Returns whether the response was applied.
    pub async fn finish_read(&self, ticket: ReadTicket, pet: Pet) -> bool {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(ticket.pet_id).or_default();
        if ticket.seq <= entry.written {
            debug!(
                "Dropping stale read #{} for pet {} (current #{})",
                ticket.seq, ticket.pet_id, entry.written
            );
            return false;
        }
        entry.pet = Some(pet);
        entry.written = ticket.seq;
        true
    }

    /// Register a read of the full pet list; its response must be handed to
    /// [`finish_list_read`](Self::finish_list_read).
    pub fn begin_list_read(&self) -> ListTicket {
        ListTicket {
            seq: self.next_seq(),
        }
    }

    /// Store a listing response. Each pet is applied unless something newer
    /// was written for it after the listing was requested. Returns how many
    /// records were applied.
    pub async fn finish_list_read(&self, ticket: ListTicket, pets: Vec<Pet>) -> usize {
        let ids: Vec<PetId> = pets.iter().map(|p| p.id).collect();
        let mut applied = 0;
        {
            let mut entries = self.entries.write().await;
            for pet in pets {
                let entry = entries.entry(pet.id).or_default();
                if ticket.seq <= entry.written {
                    debug!("Keeping newer record for pet {} over listing #{}", pet.id, ticket.seq);
                    continue;
                }
                entry.pet = Some(pet);
                entry.written = ticket.seq;
                applied += 1;
            }
        }
        *self.listing.write().await = ids;
        applied
    }

    /// Every listed pet, in listing order, as currently cached.
    pub async fn listed(&self) -> Vec<Pet> {
        let ids = self.listing.read().await.clone();
        let entries = self.entries.read().await;
        ids.iter()
            .filter_map(|id| entries.get(id).and_then(|e| e.pet.clone()))
            .collect()
    }

    /// Fetch `pet_id` and store the response if it is still the freshest.
    pub async fn refresh(&self, api: &dyn PetCareApi, pet_id: PetId) -> Result<Option<Pet>> {
        let ticket = self.begin_read(pet_id);
        let pet = api.get_pet(pet_id).await?;
        self.finish_read(ticket, pet).await;
        Ok(self.get(pet_id).await)
    }

    /// Store a record confirmed by the server.
    pub async fn store(&self, pet: Pet) {
        let seq = self.next_seq();
        let mut entries = self.entries.write().await;
        let entry = entries.entry(pet.id).or_default();
        entry.pet = Some(pet);
        entry.written = seq;
    }

    /// Merge `patch` into the cached record ahead of server confirmation.
    ///
    /// Reads started before this call are superseded.
    pub async fn apply_optimistic(&self, pet_id: PetId, patch: &PetPatch) -> Result<Snapshot> {
        let seq = self.next_seq();
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(&pet_id)
            .filter(|e| e.pet.is_some())
            .ok_or(Error::NotLoaded(pet_id))?;
        let current = entry.pet.as_mut().ok_or(Error::NotLoaded(pet_id))?;
        let snapshot = Snapshot {
            pet_id,
            previous: current.clone(),
        };
        current.apply(patch);
        entry.written = seq;
        info!("Applied optimistic update to pet {}", pet_id);
        Ok(snapshot)
    }

    /// Restore the record captured by `snapshot`.
    pub async fn rollback(&self, snapshot: Snapshot) {
        let seq = self.next_seq();
        let mut entries = self.entries.write().await;
        let entry = entries.entry(snapshot.pet_id).or_default();
        entry.pet = Some(snapshot.previous);
        entry.written = seq;
        info!("Rolled back optimistic update to pet {}", snapshot.pet_id);
    }

    /// Claim the single update slot for `pet_id`. `None` while another update
    /// for the same pet is in flight.
    pub fn try_begin_update(&self, pet_id: PetId) -> Option<UpdateGuard<'_>> {
        let mut updating = self.updating.lock().unwrap_or_else(|e| e.into_inner());
        if updating.insert(pet_id) {
            Some(UpdateGuard { cache: self, pet_id })
        } else {
            None
        }
    }

    pub fn is_updating(&self, pet_id: PetId) -> bool {
        self.updating
            .lock()
            .map(|updating| updating.contains(&pet_id))
            .unwrap_or(false)
    }
}

/// Releases the update slot when dropped
#[derive(Debug)]
pub struct UpdateGuard<'a> {
    cache: &'a PetCache,
    pet_id: PetId,
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        let mut updating = self.cache.updating.lock().unwrap_or_else(|e| e.into_inner());
        updating.remove(&self.pet_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawsport_domain::{PetField, Size, Status};

    fn pet(weight: f64) -> Pet {
        Pet {
            id: 7,
            client_id: 1,
            name: "Noddy".into(),
            status: Status::Active,
            kind: "Dog".into(),
            breed: "Beagle".into(),
            size: Size::Medium,
            temper: String::new(),
            color: String::new(),
            gender: "Male".into(),
            weight_kg: weight,
            dob: "2019-04-02".into(),
            attributes: vec![],
            notes: None,
            customer_notes: None,
            photos: vec![],
        }
    }

    #[tokio::test]
    async fn test_stale_read_is_dropped() {
        let cache = PetCache::new();
        let older = cache.begin_read(7);
        let newer = cache.begin_read(7);

        assert!(cache.finish_read(newer, pet(20.0)).await);
        assert!(!cache.finish_read(older, pet(10.0)).await);
        assert_eq!(cache.get(7).await.unwrap().weight_kg, 20.0);
    }

    #[tokio::test]
    async fn test_older_read_applies_until_newer_lands() {
        let cache = PetCache::new();
        let older = cache.begin_read(7);
        let newer = cache.begin_read(7);

        assert!(cache.finish_read(older, pet(10.0)).await);
        assert!(cache.finish_read(newer, pet(20.0)).await);
        assert_eq!(cache.get(7).await.unwrap().weight_kg, 20.0);
    }

    #[tokio::test]
    async fn test_optimistic_update_and_rollback() {
        let cache = PetCache::new();
        cache.store(pet(15.4)).await;

        let mut patch = PetPatch::default();
        patch.set_text(PetField::WeightKg, "26.75");
        let snapshot = cache.apply_optimistic(7, &patch).await.unwrap();
        assert_eq!(cache.get(7).await.unwrap().weight_kg, 26.75);
        assert_eq!(snapshot.previous().weight_kg, 15.4);

        cache.rollback(snapshot).await;
        assert_eq!(cache.get(7).await.unwrap(), pet(15.4));
    }

    #[tokio::test]
    async fn test_optimistic_update_supersedes_pending_read() {
        let cache = PetCache::new();
        cache.store(pet(15.4)).await;
        let pending = cache.begin_read(7);

        cache.apply_optimistic(7, &PetPatch::status_only(Status::Inactive)).await.unwrap();
        assert!(!cache.finish_read(pending, pet(15.4)).await);
        assert_eq!(cache.get(7).await.unwrap().status, Status::Inactive);
    }

    #[tokio::test]
    async fn test_optimistic_update_requires_loaded_pet() {
        let cache = PetCache::new();
        let err = cache.apply_optimistic(7, &PetPatch::default()).await.unwrap_err();
        assert!(matches!(err, Error::NotLoaded(7)));
    }

    #[tokio::test]
    async fn test_listing_keeps_newer_writes() {
        let cache = PetCache::new();
        let listing = cache.begin_list_read();
        cache.store(pet(26.75)).await;

        let mut luna = pet(8.0);
        luna.id = 10;
        luna.name = "Luna".into();
        assert_eq!(cache.finish_list_read(listing, vec![pet(15.4), luna]).await, 1);

        let listed = cache.listed().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].weight_kg, 26.75);
        assert_eq!(listed[1].name, "Luna");
    }

    #[tokio::test]
    async fn test_listing_follows_later_rollback() {
        let cache = PetCache::new();
        let listing = cache.begin_list_read();
        cache.finish_list_read(listing, vec![pet(15.4)]).await;

        let snapshot = cache
            .apply_optimistic(7, &PetPatch::status_only(Status::Inactive))
            .await
            .unwrap();
        assert_eq!(cache.listed().await[0].status, Status::Inactive);
        cache.rollback(snapshot).await;
        assert_eq!(cache.listed().await[0].status, Status::Active);
    }

    #[test]
    fn test_update_slot_is_exclusive() {
        let cache = PetCache::new();
        let guard = cache.try_begin_update(7);
        assert!(guard.is_some());
        assert!(cache.is_updating(7));
        assert!(cache.try_begin_update(7).is_none());
        assert!(cache.try_begin_update(8).is_some());

        drop(guard);
        assert!(!cache.is_updating(7));
        assert!(cache.try_begin_update(7).is_some());
    }
}
