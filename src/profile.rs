//! Pet profile edit controller
//!
//! Drives a single pet's drawer through `Viewing -> Editing -> Saving`:
//!
//! - `begin_edit` copies the canonical record into a draft
//! - field changes only touch the draft
//! - `save` validates locally, then applies the draft optimistically to the
//!   cache and sends it. Success returns to `Viewing`; failure restores the
//!   snapshot taken before the optimistic write and returns to `Editing` with
//!   the draft intact so the user can retry.
//! - `change_status` runs the same optimistic mutation from `Viewing` without
//!   form validation.
//!
//! At most one update per pet is in flight; a second request while `Saving`
//! is refused with [`Error::SaveInFlight`].

use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use pawsport_api::PetCareApi;
use pawsport_domain::{
    calculate_age_at, validate_at, Age, Clock, FormErrors, Pet, PetField, PetId, PetPatch, Status,
};

use crate::cache::PetCache;
use crate::error::{Error, Result};
use crate::toasts::Toasts;

pub const SAVE_SUCCESS_MESSAGE: &str = "Pet profile updated successfully";
pub const SAVE_FAILURE_FALLBACK: &str = "Failed to update pet profile";
pub const FIX_ERRORS_MESSAGE: &str = "Please fix validation errors before saving";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Viewing,
    Editing,
    Saving,
}

#[derive(Debug)]
struct Session {
    state: EditState,
    draft: Option<PetPatch>,
    /// Errors are shown only once a save has been attempted.
    tried_save: bool,
}

/// Edit controller for one pet
pub struct PetProfile {
    pet_id: PetId,
    api: Arc<dyn PetCareApi>,
    cache: Arc<PetCache>,
    toasts: Toasts,
    clock: Arc<dyn Clock>,
    session: Mutex<Session>,
}

impl PetProfile {
    pub fn new(
        pet_id: PetId,
        api: Arc<dyn PetCareApi>,
        cache: Arc<PetCache>,
        toasts: Toasts,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pet_id,
            api,
            cache,
            toasts,
            clock,
            session: Mutex::new(Session {
                state: EditState::Viewing,
                draft: None,
                tried_save: false,
            }),
        }
    }

    pub fn pet_id(&self) -> PetId {
        self.pet_id
    }

    /// Load the pet into the cache. A newer read for the same pet wins over
    /// this one if it lands first.
    pub async fn open(&self) -> Result<Pet> {
        self.cache
            .refresh(self.api.as_ref(), self.pet_id)
            .await?
            .ok_or(Error::NotLoaded(self.pet_id))
    }

    /// The canonical record, including any optimistic update in flight
    pub async fn pet(&self) -> Option<Pet> {
        self.cache.get(self.pet_id).await
    }

    pub async fn age(&self) -> Option<Age> {
        let now = self.clock.now();
        self.pet().await.map(|pet| calculate_age_at(&pet.dob, now))
    }

    pub async fn state(&self) -> EditState {
        self.session.lock().await.state
    }

    pub async fn draft(&self) -> Option<PetPatch> {
        self.session.lock().await.draft.clone()
    }

    /// `Viewing -> Editing`, seeding the draft from the canonical record.
    pub async fn begin_edit(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        match session.state {
            EditState::Viewing => {}
            EditState::Editing => return Ok(()),
            EditState::Saving => return Err(Error::SaveInFlight),
        }
        let pet = self.cache.get(self.pet_id).await.ok_or(Error::NotLoaded(self.pet_id))?;
        session.draft = Some(PetPatch::from(&pet));
        session.state = EditState::Editing;
        session.tried_save = false;
        info!("Pet {}: Viewing -> Editing", self.pet_id);
        Ok(())
    }

    /// Apply a raw form value to the draft.
    pub async fn set_field(&self, field: PetField, raw: &str) -> Result<()> {
        self.edit_draft(|draft| draft.set_text(field, raw)).await
    }

    pub async fn toggle_attribute(&self, attr: &str) -> Result<()> {
        self.edit_draft(|draft| draft.toggle_attribute(attr)).await
    }

    async fn edit_draft<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut PetPatch),
    {
        let mut session = self.session.lock().await;
        match (session.state, session.draft.as_mut()) {
            (EditState::Editing, Some(draft)) => {
                f(draft);
                Ok(())
            }
            (EditState::Saving, _) => Err(Error::SaveInFlight),
            _ => Err(Error::NotEditing),
        }
    }

    /// `Editing -> Viewing`, discarding the draft.
    pub async fn cancel_edit(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        match session.state {
            EditState::Editing => {
                session.state = EditState::Viewing;
                session.draft = None;
                session.tried_save = false;
                info!("Pet {}: edit cancelled", self.pet_id);
                Ok(())
            }
            EditState::Saving => Err(Error::SaveInFlight),
            EditState::Viewing => Ok(()),
        }
    }

    /// Validation errors to display next to the form fields.
    pub async fn visible_errors(&self) -> FormErrors {
        let session = self.session.lock().await;
        match (&session.draft, session.tried_save) {
            (Some(draft), true) if session.state == EditState::Editing => {
                validate_at(draft, self.clock.as_ref())
            }
            _ => FormErrors::default(),
        }
    }

    /// Whether the save action should be enabled.
    pub async fn can_save(&self) -> bool {
        let session = self.session.lock().await;
        match (&session.draft, session.state) {
            (Some(draft), EditState::Editing) => {
                validate_at(draft, self.clock.as_ref()).is_empty()
                    && !self.cache.is_updating(self.pet_id)
            }
            _ => false,
        }
    }

    /// `Editing -> Saving -> Viewing | Editing`.
    ///
    /// Invalid drafts never reach the network: the state stays `Editing` and a
    /// notification asks the user to fix the form.
    pub async fn save(&self) -> Result<Pet> {
        let draft = {
            let mut session = self.session.lock().await;
            match session.state {
                EditState::Editing => {}
                EditState::Saving => return Err(Error::SaveInFlight),
                EditState::Viewing => return Err(Error::NotEditing),
            }
            session.tried_save = true;
            let draft = session.draft.clone().ok_or(Error::NotEditing)?;
            let errors = validate_at(&draft, self.clock.as_ref());
            if !errors.is_empty() {
                drop(session);
                debug!("Pet {}: save blocked by validation: {}", self.pet_id, errors);
                self.toasts.error(FIX_ERRORS_MESSAGE).await;
                return Err(Error::Validation(errors));
            }
            session.state = EditState::Saving;
            draft
        };
        info!("Pet {}: Editing -> Saving", self.pet_id);

        let result = self.mutate(&draft).await;

        let mut session = self.session.lock().await;
        match &result {
            Ok(_) => {
                session.state = EditState::Viewing;
                session.draft = None;
                session.tried_save = false;
                info!("Pet {}: Saving -> Viewing", self.pet_id);
            }
            Err(_) => {
                session.state = EditState::Editing;
                info!("Pet {}: Saving -> Editing", self.pet_id);
            }
        }
        result
    }

    /// Status toggle from `Viewing`; skips form validation.
    pub async fn change_status(&self, status: Status) -> Result<Pet> {
        {
            let mut session = self.session.lock().await;
            match session.state {
                EditState::Viewing => session.state = EditState::Saving,
                EditState::Saving => return Err(Error::SaveInFlight),
                EditState::Editing => return Err(Error::EditInProgress),
            }
        }
        info!("Pet {}: changing status to {}", self.pet_id, status);

        let result = self.mutate(&PetPatch::status_only(status)).await;
        self.session.lock().await.state = EditState::Viewing;
        result
    }

    /// Optimistic write, remote update, then commit or roll back.
    async fn mutate(&self, patch: &PetPatch) -> Result<Pet> {
        let _slot = self.cache.try_begin_update(self.pet_id).ok_or(Error::SaveInFlight)?;
        let snapshot = self.cache.apply_optimistic(self.pet_id, patch).await?;

        let outcome = match self.api.update_pet(self.pet_id, patch).await {
            Ok(pet) => {
                self.cache.store(pet.clone()).await;
                self.toasts.success(SAVE_SUCCESS_MESSAGE).await;
                Ok(pet)
            }
            Err(err) => {
                warn!("Pet {}: update failed: {}", self.pet_id, err);
                self.cache.rollback(snapshot).await;
                let message = err.message();
                let message = if message.trim().is_empty() {
                    SAVE_FAILURE_FALLBACK.to_string()
                } else {
                    message
                };
                self.toasts.error(message).await;
                Err(Error::Api(err))
            }
        };

        self.reconcile().await;
        outcome
    }

    /// Follow-up read after a settled mutation; failures leave the cache as is.
    async fn reconcile(&self) {
        if let Err(e) = self.cache.refresh(self.api.as_ref(), self.pet_id).await {
            warn!("Pet {}: follow-up read failed: {}", self.pet_id, e);
        }
    }
}
