use std::sync::Arc;

use super::{paths, ServiceError};
use crate::database::models::EmergencyProfile;
use crate::database::{DocumentStore, Repository};

/// The one emergency profile kept per pet.
#[derive(Clone)]
pub struct EmergencyProfileService {
    profiles: Repository<EmergencyProfile>,
}

impl EmergencyProfileService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            profiles: Repository::new(store),
        }
    }

    /// Create or overwrite the profile.
    pub async fn set(&self, user_id: &str, pet_id: &str, mut profile: EmergencyProfile) -> Result<EmergencyProfile, ServiceError> {
        profile.emergency_profile_id = EmergencyProfile::DOCUMENT_ID.to_string();
        self.profiles
            .set(&paths::emergency_profile(user_id, pet_id)?, &profile)
            .await?;
        Ok(profile)
    }

    pub async fn get(&self, user_id: &str, pet_id: &str) -> Result<EmergencyProfile, ServiceError> {
        self.profiles
            .get(&paths::emergency_profile(user_id, pet_id)?)
            .await?
            .ok_or(ServiceError::NotFound("Emergency profile"))
    }

    /// Replace an existing profile.
    pub async fn update(&self, user_id: &str, pet_id: &str, profile: EmergencyProfile) -> Result<EmergencyProfile, ServiceError> {
        let path = paths::emergency_profile(user_id, pet_id)?;
        if !self.profiles.exists(&path).await? {
            return Err(ServiceError::NotFound("Emergency profile"));
        }
        self.set(user_id, pet_id, profile).await
    }

    pub async fn delete(&self, user_id: &str, pet_id: &str) -> Result<(), ServiceError> {
        let path = paths::emergency_profile(user_id, pet_id)?;
        if !self.profiles.exists(&path).await? {
            return Err(ServiceError::NotFound("Emergency profile"));
        }
        self.profiles.delete(&path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryDocumentStore;

    #[tokio::test]
    async fn profile_lifecycle() {
        let profiles = EmergencyProfileService::new(Arc::new(MemoryDocumentStore::new()));
        assert!(matches!(
            profiles.update("u1", "p1", EmergencyProfile::default()).await,
            Err(ServiceError::NotFound(_))
        ));

        let created = profiles
            .set(
                "u1",
                "p1",
                EmergencyProfile {
                    blood_type: Some("DEA 1.1+".into()),
                    chronic_conditions: vec!["arthritis".into()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.emergency_profile_id, "profile");

        profiles
            .update(
                "u1",
                "p1",
                EmergencyProfile {
                    special_instructions: Some("Muzzle before handling".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let stored = profiles.get("u1", "p1").await.unwrap();
        assert!(stored.blood_type.is_none());
        assert!(stored.chronic_conditions.is_empty());

        profiles.delete("u1", "p1").await.unwrap();
        assert!(matches!(profiles.get("u1", "p1").await, Err(ServiceError::NotFound(_))));
    }
}
