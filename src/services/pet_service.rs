use base64::{prelude::BASE64_STANDARD, Engine};
use std::sync::Arc;

use super::{paths, ServiceError};
use crate::database::models::Pet;
use crate::database::{new_document_id, DocumentStore, Query, Repository};

#[derive(Clone)]
pub struct PetService {
    pets: Repository<Pet>,
}

/// Images arrive as bare base64 or as a `data:` URL; either way the payload must decode.
fn check_image(image: Option<&str>) -> Result<(), ServiceError> {
    let Some(image) = image else {
        return Ok(());
    };
    let payload = match image.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| ServiceError::validation("imageBase64", "Image data URL must be base64"))?,
        None => image,
    };
    BASE64_STANDARD
        .decode(payload.trim())
        .map(|_| ())
        .map_err(|e| ServiceError::validation("imageBase64", format!("Image is not valid base64: {}", e)))
}

impl PetService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            pets: Repository::new(store),
        }
    }

    /// Store a new pet under `user_id`. The id and owner are assigned here.
    pub async fn create(&self, user_id: &str, pet: Pet) -> Result<Pet, ServiceError> {
        let mut pet = pet.normalized();
        check_image(pet.image_base64.as_deref())?;

        pet.pet_id = new_document_id();
        pet.owner_id = user_id.to_string();

        self.pets.set(&paths::pet(user_id, &pet.pet_id)?, &pet).await?;
        tracing::debug!("Created pet {} for user {}", pet.pet_id, user_id);
        Ok(pet)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Pet>, ServiceError> {
        let pets = self.pets.select_any(&paths::pets(user_id)?, &Query::new()).await?;
        Ok(pets.into_iter().map(Pet::normalized).collect())
    }

    pub async fn get(&self, user_id: &str, pet_id: &str) -> Result<Option<Pet>, ServiceError> {
        let pet = self.pets.get(&paths::pet(user_id, pet_id)?).await?;
        Ok(pet.map(Pet::normalized))
    }

    /// Replace the pet document. Id and owner always come from the path.
    pub async fn update(&self, user_id: &str, pet_id: &str, pet: Pet) -> Result<Pet, ServiceError> {
        let path = paths::pet(user_id, pet_id)?;
        if !self.pets.exists(&path).await? {
            return Err(ServiceError::NotFound("Pet"));
        }

        let mut pet = pet.normalized();
        check_image(pet.image_base64.as_deref())?;
        pet.pet_id = pet_id.to_string();
        pet.owner_id = user_id.to_string();

        self.pets.set(&path, &pet).await?;
        Ok(pet)
    }

    pub async fn delete(&self, user_id: &str, pet_id: &str) -> Result<(), ServiceError> {
        let path = paths::pet(user_id, pet_id)?;
        if !self.pets.exists(&path).await? {
            return Err(ServiceError::NotFound("Pet"));
        }
        self.pets.delete(&path).await?;
        Ok(())
    }
}
