//! Records exchanged with the PawsPort REST API
//!
//! Field names follow the API's camelCase JSON. Everything here is plain data;
//! the only behaviour is merging a [`PetPatch`] into a [`Pet`] and applying raw
//! form input to a patch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::validation::toggle_attribute;

pub type ClientId = u64;
pub type PetId = u64;
pub type VaccinationId = u64;

/// Attribute tags offered by the edit form.
pub const ATTRIBUTE_OPTIONS: [&str; 6] =
    ["Barks", "Blind", "Escaper", "Shy", "Friendly", "Aggressive"];

/// Membership status shared by clients and pets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub fn is_active(self) -> bool {
        matches!(self, Status::Active)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    pub fn as_str(self) -> &'static str {
        match self {
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pet size: {0:?}")]
pub struct UnknownSize(pub String);

impl FromStr for Size {
    type Err = UnknownSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Small" => Ok(Size::Small),
            "Medium" => Ok(Size::Medium),
            "Large" => Ok(Size::Large),
            other => Err(UnknownSize(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
}

/// A pet owner. Read-only on the client side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: String,
    pub status: Status,
}

/// The canonical pet record as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: PetId,
    pub client_id: ClientId,
    pub name: String,
    pub status: Status,
    #[serde(rename = "type")]
    pub kind: String,
    pub breed: String,
    pub size: Size,
    #[serde(default)]
    pub temper: String,
    #[serde(default)]
    pub color: String,
    pub gender: String,
    pub weight_kg: f64,
    /// ISO calendar date, `YYYY-MM-DD`
    pub dob: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub customer_notes: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl Pet {
    /// Merge every field present in `patch` into this record.
    pub fn apply(&mut self, patch: &PetPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(kind) = &patch.kind {
            self.kind = kind.clone();
        }
        if let Some(breed) = &patch.breed {
            self.breed = breed.clone();
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(temper) = &patch.temper {
            self.temper = temper.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(gender) = &patch.gender {
            self.gender = gender.clone();
        }
        if let Some(weight) = patch.weight_kg {
            self.weight_kg = weight;
        }
        if let Some(dob) = &patch.dob {
            self.dob = dob.clone();
        }
        if let Some(attributes) = &patch.attributes {
            self.attributes = attributes.clone();
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(customer_notes) = &patch.customer_notes {
            self.customer_notes = Some(customer_notes.clone());
        }
        if let Some(photos) = &patch.photos {
            self.photos = photos.clone();
        }
    }

    /// Weight as shown on the details tab, e.g. `26.75 kg`.
    pub fn weight_label(&self) -> String {
        format!("{} kg", self.weight_kg)
    }
}

/// Editable pet fields, keyed by their JSON names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PetField {
    Name,
    Type,
    Breed,
    Gender,
    Size,
    Dob,
    WeightKg,
    Temper,
    Color,
    Notes,
    CustomerNotes,
}

impl PetField {
    pub fn as_str(self) -> &'static str {
        match self {
            PetField::Name => "name",
            PetField::Type => "type",
            PetField::Breed => "breed",
            PetField::Gender => "gender",
            PetField::Size => "size",
            PetField::Dob => "dob",
            PetField::WeightKg => "weightKg",
            PetField::Temper => "temper",
            PetField::Color => "color",
            PetField::Notes => "notes",
            PetField::CustomerNotes => "customerNotes",
        }
    }
}

impl fmt::Display for PetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partial pet record.
///
/// Serves both as the PATCH body sent to the API (absent fields are not
/// serialised) and as the edit form's draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
}

impl PetPatch {
    pub fn status_only(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn photos_only(photos: Vec<String>) -> Self {
        Self {
            photos: Some(photos),
            ..Default::default()
        }
    }

    /// Apply a raw form value to `field`.
    ///
    /// `weightKg` is parsed as a float and becomes NaN when unparseable or not
    /// finite, so the validator reports it as missing. An unknown size clears
    /// the size.
    pub fn set_text(&mut self, field: PetField, raw: &str) {
        let text = raw.to_string();
        match field {
            PetField::Name => self.name = Some(text),
            PetField::Type => self.kind = Some(text),
            PetField::Breed => self.breed = Some(text),
            PetField::Gender => self.gender = Some(text),
            PetField::Size => self.size = raw.parse().ok(),
            PetField::Dob => self.dob = Some(text),
            PetField::WeightKg => {
                let weight = raw.trim().parse::<f64>().ok().filter(|w| w.is_finite());
                self.weight_kg = Some(weight.unwrap_or(f64::NAN));
            }
            PetField::Temper => self.temper = Some(text),
            PetField::Color => self.color = Some(text),
            PetField::Notes => self.notes = Some(text),
            PetField::CustomerNotes => self.customer_notes = Some(text),
        }
    }

    pub fn toggle_attribute(&mut self, attr: &str) {
        let current = self.attributes.as_deref().unwrap_or(&[]);
        self.attributes = Some(toggle_attribute(current, attr));
    }

    pub fn has_attribute(&self, attr: &str) -> bool {
        self.attributes
            .as_ref()
            .map_or(false, |attrs| attrs.iter().any(|a| a == attr))
    }
}

impl From<&Pet> for PetPatch {
    fn from(pet: &Pet) -> Self {
        Self {
            name: Some(pet.name.clone()),
            status: Some(pet.status),
            kind: Some(pet.kind.clone()),
            breed: Some(pet.breed.clone()),
            size: Some(pet.size),
            temper: Some(pet.temper.clone()),
            color: Some(pet.color.clone()),
            gender: Some(pet.gender.clone()),
            weight_kg: Some(pet.weight_kg),
            dob: Some(pet.dob.clone()),
            attributes: Some(pet.attributes.clone()),
            notes: pet.notes.clone(),
            customer_notes: pet.customer_notes.clone(),
            photos: Some(pet.photos.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vaccination {
    pub id: VaccinationId,
    pub pet_id: PetId,
    pub vaccine: String,
    /// Administered date
    pub date: String,
    pub due: String,
}

/// Body of `POST /vaccinations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVaccination {
    pub pet_id: PetId,
    pub vaccine: String,
    pub date: String,
    pub due: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grooming {
    pub id: u64,
    pub pet_id: PetId,
    pub service: String,
    pub date: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: u64,
    pub pet_id: PetId,
    #[serde(rename = "type")]
    pub kind: String,
    pub start: String,
    pub end: String,
    pub status: BookingStatus,
}
