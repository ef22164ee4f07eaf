//! Validation of the pet edit form

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::dates::is_date_in_future_at;
use crate::models::{PetField, PetPatch};

/// Text fields that must be present and non-blank.
pub const REQUIRED_FIELDS: [PetField; 5] = [
    PetField::Name,
    PetField::Type,
    PetField::Breed,
    PetField::Gender,
    PetField::Size,
];

pub const MIN_WEIGHT_KG: f64 = 0.0;
pub const MAX_WEIGHT_KG: f64 = 200.0;
pub const MAX_WEIGHT_DECIMALS: usize = 2;

/// Why a single field was rejected. `Display` is the message shown next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Required")]
    Required,

    #[error("Date cannot be in the future")]
    FutureDate,

    #[error("Weight must be between 0 and 200")]
    WeightOutOfRange,

    #[error("Max 2 decimals")]
    TooManyDecimals,
}

/// Field-scoped validation errors; valid fields have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<PetField, FieldError>);

impl FormErrors {
    pub fn get(&self, field: PetField) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    pub fn message(&self, field: PetField) -> Option<String> {
        self.get(field).map(|e| e.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = PetField> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PetField, FieldError)> + '_ {
        self.0.iter().map(|(field, error)| (*field, *error))
    }

    fn insert(&mut self, field: PetField, error: FieldError) {
        self.0.insert(field, error);
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, error)| format!("{}: {}", field, error))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Validate a draft against the system clock.
pub fn validate(draft: &PetPatch) -> FormErrors {
    validate_at(draft, &SystemClock)
}

/// Validate every field of `draft`. Fields are checked independently, so the
/// result lists all offending fields at once.
pub fn validate_at(draft: &PetPatch, clock: &dyn Clock) -> FormErrors {
    let mut errors = FormErrors::default();

    for field in REQUIRED_FIELDS {
        if !required_present(draft, field) {
            errors.insert(field, FieldError::Required);
        }
    }

    if let Some(error) = check_dob(draft.dob.as_deref(), clock) {
        errors.insert(PetField::Dob, error);
    }

    if let Some(error) = check_weight(draft.weight_kg) {
        errors.insert(PetField::WeightKg, error);
    }

    errors
}

pub fn has_errors(errors: &FormErrors) -> bool {
    !errors.is_empty()
}

/// Remove `attr` if present, otherwise append it. The input is left untouched.
pub fn toggle_attribute(list: &[String], attr: &str) -> Vec<String> {
    if list.iter().any(|a| a == attr) {
        list.iter().filter(|a| *a != attr).cloned().collect()
    } else {
        let mut next = list.to_vec();
        next.push(attr.to_string());
        next
    }
}

fn required_present(draft: &PetPatch, field: PetField) -> bool {
    let text = match field {
        PetField::Name => draft.name.as_deref(),
        PetField::Type => draft.kind.as_deref(),
        PetField::Breed => draft.breed.as_deref(),
        PetField::Gender => draft.gender.as_deref(),
        PetField::Size => return draft.size.is_some(),
        _ => return true,
    };
    text.map_or(false, |t| !t.trim().is_empty())
}

fn check_dob(dob: Option<&str>, clock: &dyn Clock) -> Option<FieldError> {
    let dob = match dob {
        Some(dob) if !dob.trim().is_empty() => dob,
        _ => return Some(FieldError::Required),
    };
    // An unparseable date is never "in the future", so it passes.
    if is_date_in_future_at(dob, clock.now()) {
        return Some(FieldError::FutureDate);
    }
    None
}

fn check_weight(weight: Option<f64>) -> Option<FieldError> {
    let weight = match weight {
        Some(w) if w.is_finite() => w,
        _ => return Some(FieldError::Required),
    };
    if !(MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&weight) {
        return Some(FieldError::WeightOutOfRange);
    }
    if decimal_places(weight) > MAX_WEIGHT_DECIMALS {
        return Some(FieldError::TooManyDecimals);
    }
    None
}

/// Fractional digits in the shortest decimal representation of `value`.
fn decimal_places(value: f64) -> usize {
    value
        .to_string()
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len())
}
