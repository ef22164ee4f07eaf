//! Pet photo gallery: upload and delete
//!
//! Photos are stored on the pet record itself as `data:` URLs, so both
//! operations are a pet update carrying only the new `photos` list.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;

use pawsport_api::PetCareApi;
use pawsport_domain::{Pet, PetId, PetPatch};

use crate::cache::PetCache;
use crate::error::{Error, Result};
use crate::toasts::Toasts;

pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

pub const PHOTOS_UPDATED_MESSAGE: &str = "Photos updated successfully";
pub const PHOTOS_FAILED_MESSAGE: &str = "Failed to update photos";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhotoError {
    #[error("Invalid file format. Only JPG, PNG, WEBP allowed.")]
    UnsupportedFormat(String),

    #[error("File too large. Max 5MB.")]
    TooLarge(usize),
}

/// Check an uploaded file and encode it as a `data:` URL.
pub fn encode_photo(mime: &str, bytes: &[u8]) -> std::result::Result<String, PhotoError> {
    let mime = mime.trim().to_ascii_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(PhotoError::UnsupportedFormat(mime));
    }
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(PhotoError::TooLarge(bytes.len()));
    }
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

pub struct PetPhotos {
    pet_id: PetId,
    api: Arc<dyn PetCareApi>,
    cache: Arc<PetCache>,
    toasts: Toasts,
}

impl PetPhotos {
    pub fn new(
        pet_id: PetId,
        api: Arc<dyn PetCareApi>,
        cache: Arc<PetCache>,
        toasts: Toasts,
    ) -> Self {
        Self {
            pet_id,
            api,
            cache,
            toasts,
        }
    }

    pub async fn photos(&self) -> Vec<String> {
        self.cache.get(self.pet_id).await.map(|pet| pet.photos).unwrap_or_default()
    }

    /// Append a photo. Rejected files are reported with an error toast and
    /// never sent.
    pub async fn upload(&self, mime: &str, bytes: &[u8]) -> Result<Pet> {
        let reference = match encode_photo(mime, bytes) {
            Ok(reference) => reference,
            Err(e) => {
                warn!("Rejected photo for pet {}: {:?}", self.pet_id, e);
                self.toasts.error(e.to_string()).await;
                return Err(e.into());
            }
        };
        let pet = self.cache.get(self.pet_id).await.ok_or(Error::NotLoaded(self.pet_id))?;
        let mut photos = pet.photos;
        photos.push(reference);
        self.replace(photos).await
    }

    /// Remove the photo at `index`.
    pub async fn delete(&self, index: usize) -> Result<Pet> {
        let pet = self.cache.get(self.pet_id).await.ok_or(Error::NotLoaded(self.pet_id))?;
        let mut photos = pet.photos;
        if index >= photos.len() {
            return Err(Error::invalid_input(format!(
                "No photo at index {} (pet {} has {})",
                index,
                self.pet_id,
                photos.len()
            )));
        }
        photos.remove(index);
        self.replace(photos).await
    }

    async fn replace(&self, photos: Vec<String>) -> Result<Pet> {
        let _slot = self.cache.try_begin_update(self.pet_id).ok_or(Error::SaveInFlight)?;
        let count = photos.len();

        let outcome = match self.api.update_pet(self.pet_id, &PetPatch::photos_only(photos)).await {
            Ok(pet) => {
                info!("Pet {} now has {} photo(s)", self.pet_id, count);
                self.cache.store(pet.clone()).await;
                self.toasts.success(PHOTOS_UPDATED_MESSAGE).await;
                Ok(pet)
            }
            Err(e) => {
                warn!("Failed to update photos for pet {}: {}", self.pet_id, e);
                self.toasts.error(PHOTOS_FAILED_MESSAGE).await;
                Err(Error::Api(e))
            }
        };

        if let Err(e) = self.cache.refresh(self.api.as_ref(), self.pet_id).await {
            warn!("Pet {}: follow-up read failed: {}", self.pet_id, e);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_accepted_types() {
        assert_eq!(encode_photo("image/png", b"abc").unwrap(), "data:image/png;base64,YWJj");
        assert_eq!(encode_photo("IMAGE/JPEG", b"").unwrap(), "data:image/jpeg;base64,");
        assert!(encode_photo("image/webp", &[0u8; 16]).is_ok());
    }

    #[test]
    fn test_rejects_other_formats() {
        let err = encode_photo("image/gif", b"GIF89a").unwrap_err();
        assert_eq!(err, PhotoError::UnsupportedFormat("image/gif".into()));
        assert_eq!(err.to_string(), "Invalid file format. Only JPG, PNG, WEBP allowed.");
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(encode_photo("image/png", &vec![0u8; MAX_PHOTO_BYTES]).is_ok());
        let err = encode_photo("image/png", &vec![0u8; MAX_PHOTO_BYTES + 1]).unwrap_err();
        assert_eq!(err.to_string(), "File too large. Max 5MB.");
    }
}
