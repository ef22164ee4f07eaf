//! Error handling for the PawsPort dashboard

use thiserror::Error;

use pawsport_api::ApiError;
use pawsport_domain::{DateError, FormErrors, PetId};

use crate::photos::PhotoError;

/// Unified error type for dashboard operations
#[derive(Error, Debug)]
pub enum Error {
    /// The backend rejected the call or could not be reached
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The edit form has invalid fields; nothing was sent
    #[error("Validation failed: {0}")]
    Validation(FormErrors),

    /// An update for this pet is already in flight
    #[error("An update for this pet is already in progress")]
    SaveInFlight,

    #[error("Not in edit mode")]
    NotEditing,

    #[error("Finish or cancel the current edit first")]
    EditInProgress,

    #[error("Pet {0} is not loaded")]
    NotLoaded(PetId),

    #[error("Photo rejected: {0}")]
    Photo(#[from] PhotoError),

    #[error("Date error: {0}")]
    Date(#[from] DateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn invalid_input<T: std::fmt::Display>(msg: T) -> Self {
        Error::InvalidInput(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
