#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use pawsport::config::DashboardOptions;
use pawsport::Pawsport;
use pawsport_api::{ApiError, PetCareApi, Result};
use pawsport_domain::{
    Booking, Client, ClientId, FixedClock, Grooming, NewVaccination, Pet, PetId, PetPatch, Size,
    Status, Vaccination,
};

pub fn noddy() -> Pet {
    Pet {
        id: 7,
        client_id: 1,
        name: "Noddy".into(),
        status: Status::Active,
        kind: "Dog".into(),
        breed: "Beagle".into(),
        size: Size::Medium,
        temper: "Calm".into(),
        color: "Tan".into(),
        gender: "Male".into(),
        weight_kg: 15.4,
        dob: "2019-04-02".into(),
        attributes: vec!["Friendly".into()],
        notes: None,
        customer_notes: None,
        photos: vec![],
    }
}

pub fn sarah() -> Client {
    Client {
        id: 1,
        name: "Sarah Jenkins".into(),
        email: "sarah@example.com".into(),
        status: Status::Active,
    }
}

pub fn noddy_with(f: impl FnOnce(&mut Pet)) -> Pet {
    let mut pet = noddy();
    f(&mut pet);
    pet
}

pub fn json_of(pet: &Pet) -> Value {
    serde_json::to_value(pet).unwrap()
}

/// Stopped on 2026-01-15.
pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at_midnight(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()))
}

pub fn dashboard(api: Arc<dyn PetCareApi>) -> Pawsport {
    let options = DashboardOptions::default().with_simulated_failures(false);
    Pawsport::with_api(api, options).with_clock(clock())
}

/// In-memory backend with scripted update failures and an optional gate that
/// holds updates until released.
#[derive(Default)]
pub struct FakeApi {
    clients: Mutex<Vec<Client>>,
    pets: Mutex<HashMap<PetId, Pet>>,
    update_failures: Mutex<VecDeque<(StatusCode, String)>>,
    gate: Option<Gate>,
    pub updates: AtomicUsize,
    pub reads: AtomicUsize,
}

pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl FakeApi {
    pub fn with_pet(pet: Pet) -> Self {
        let fake = Self::default();
        fake.pets.lock().unwrap().insert(pet.id, pet);
        fake
    }

    pub fn with_client(self, client: Client) -> Self {
        self.clients.lock().unwrap().push(client);
        self
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Gate {
            entered: Notify::new(),
            release: Notify::new(),
        });
        self
    }

    pub fn gate(&self) -> &Gate {
        self.gate.as_ref().unwrap()
    }

    /// The next update fails with `status` and `message`.
    pub fn fail_next_update(&self, status: StatusCode, message: &str) {
        self.update_failures
            .lock()
            .unwrap()
            .push_back((status, message.to_string()));
    }

    pub fn stored(&self, id: PetId) -> Option<Pet> {
        self.pets.lock().unwrap().get(&id).cloned()
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Pet not found")
}

#[async_trait]
impl PetCareApi for FakeApi {
    async fn list_clients(&self) -> Result<Vec<Client>> {
        Ok(self.clients.lock().unwrap().clone())
    }

    async fn list_pets(&self, client_id: Option<ClientId>) -> Result<Vec<Pet>> {
        let pets = self.pets.lock().unwrap();
        Ok(pets
            .values()
            .filter(|p| client_id.map_or(true, |c| p.client_id == c))
            .cloned()
            .collect())
    }

    async fn get_pet(&self, id: PetId) -> Result<Pet> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.stored(id).ok_or_else(not_found)
    }

    async fn update_pet(&self, id: PetId, patch: &PetPatch) -> Result<Pet> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        if let Some((status, message)) = self.update_failures.lock().unwrap().pop_front() {
            return Err(ApiError::new(status, message));
        }
        let mut pets = self.pets.lock().unwrap();
        let pet = pets.get_mut(&id).ok_or_else(not_found)?;
        pet.apply(patch);
        Ok(pet.clone())
    }

    async fn list_vaccinations(&self, _pet_id: PetId) -> Result<Vec<Vaccination>> {
        Ok(vec![])
    }

    async fn add_vaccination(&self, vaccination: &NewVaccination) -> Result<Vaccination> {
        Ok(Vaccination {
            id: 1,
            pet_id: vaccination.pet_id,
            vaccine: vaccination.vaccine.clone(),
            date: vaccination.date.clone(),
            due: vaccination.due.clone(),
        })
    }

    async fn list_grooming(&self, _pet_id: PetId) -> Result<Vec<Grooming>> {
        Ok(vec![])
    }

    async fn list_bookings(&self, _pet_id: PetId) -> Result<Vec<Booking>> {
        Ok(vec![])
    }
}
