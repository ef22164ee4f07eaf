//! PawsPort domain model
//!
//! Plain data types for clients, pets and their history records, plus the pure
//! functions the dashboard derives from them:
//!
//! - Edit-form validation ([`validate`], [`toggle_attribute`])
//! - Pet age and vaccination due dates ([`calculate_age`], [`compute_due_date`])
//!
//! Nothing in this crate performs I/O.

pub mod clock;
pub mod dates;
pub mod models;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dates::{
    calculate_age, calculate_age_at, compute_due_date, is_date_in_future, is_date_in_future_at, Age,
    DateError,
};
pub use models::{
    Booking, BookingStatus, Client, ClientId, Grooming, NewVaccination, Pet, PetField, PetId,
    PetPatch, Size, Status, Vaccination, VaccinationId, ATTRIBUTE_OPTIONS,
};
pub use validation::{has_errors, toggle_attribute, validate, validate_at, FieldError, FormErrors};
