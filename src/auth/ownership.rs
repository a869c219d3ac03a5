use thiserror::Error;

use crate::database::models::{Pet, PetScoped};
use crate::database::StoreError;
use crate::services::{PetService, ServiceError};

/// Role carried by every authenticated principal.
pub const ROLE_USER: &str = "USER";

/// The authenticated caller for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub role: &'static str,
}

impl Principal {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: ROLE_USER,
        }
    }
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ServiceError> for AccessError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(what) => AccessError::NotFound(what),
            ServiceError::Store(e) => AccessError::Store(e),
            other => AccessError::Forbidden(other.to_string()),
        }
    }
}

/// Decides whether a principal may touch a path. Checks stop at the first failure.
#[derive(Clone)]
pub struct OwnershipAuthorizer {
    pets: PetService,
}

impl OwnershipAuthorizer {
    pub fn new(pets: PetService) -> Self {
        Self { pets }
    }

    /// The path's user must be the caller.
    pub fn user(&self, principal: &Principal, user_id: &str) -> Result<(), AccessError> {
        if principal.user_id == user_id {
            Ok(())
        } else {
            Err(AccessError::Forbidden(format!(
                "user {} may not act for user {}",
                principal.user_id, user_id
            )))
        }
    }

    /// The pet must exist under the user and name that user as owner.
    pub async fn pet(&self, principal: &Principal, user_id: &str, pet_id: &str) -> Result<Pet, AccessError> {
        self.user(principal, user_id)?;

        let pet = self
            .pets
            .get(user_id, pet_id)
            .await?
            .ok_or(AccessError::NotFound("Pet"))?;

        if pet.owner_id != user_id {
            return Err(AccessError::Forbidden(format!(
                "pet {} is not owned by user {}",
                pet_id, user_id
            )));
        }
        Ok(pet)
    }

    /// A task, plan or alert must record the same user and pet it is addressed under.
    pub fn scoped<T: PetScoped>(&self, entity: &T, user_id: &str, pet_id: &str) -> Result<(), AccessError> {
        if entity.user_id() == user_id && entity.pet_id() == pet_id {
            Ok(())
        } else {
            Err(AccessError::Forbidden(format!(
                "entity belongs to {}/{}, not {}/{}",
                entity.user_id(),
                entity.pet_id(),
                user_id,
                pet_id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::TreatmentPlan;
    use crate::database::{DocumentStore, MemoryDocumentStore};
    use crate::services::paths;
    use serde_json::json;
    use std::sync::Arc;

    async fn setup() -> (Arc<dyn DocumentStore>, OwnershipAuthorizer, Pet) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let pets = PetService::new(store.clone());
        let pet = pets
            .create(
                "u1",
                Pet {
                    name: "Rex".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (store, OwnershipAuthorizer::new(pets), pet)
    }

    #[tokio::test]
    async fn caller_must_match_path_user() {
        let (_, authz, _) = setup().await;
        assert!(authz.user(&Principal::user("u1"), "u1").is_ok());
        assert!(matches!(
            authz.user(&Principal::user("u2"), "u1"),
            Err(AccessError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn pet_checks_run_in_order() {
        let (_, authz, pet) = setup().await;
        let owner = Principal::user("u1");

        let found = authz.pet(&owner, "u1", &pet.pet_id).await.unwrap();
        assert_eq!(found.name, "Rex");

        // Foreign caller is refused before the pet is looked up
        assert!(matches!(
            authz.pet(&Principal::user("u2"), "u1", "missing").await,
            Err(AccessError::Forbidden(_))
        ));
        assert!(matches!(
            authz.pet(&owner, "u1", "missing").await,
            Err(AccessError::NotFound("Pet"))
        ));
    }

    #[tokio::test]
    async fn pet_stored_with_foreign_owner_is_forbidden() {
        let (store, authz, _) = setup().await;
        store
            .set(
                &paths::pet("u1", "stray").unwrap(),
                json!({"petID": "stray", "ownerID": "u9", "name": "Stray"}),
            )
            .await
            .unwrap();

        assert!(matches!(
            authz.pet(&Principal::user("u1"), "u1", "stray").await,
            Err(AccessError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn scoped_entities_must_match_path() {
        let (_, authz, _) = setup().await;
        let plan = TreatmentPlan {
            user_id: "u1".into(),
            pet_id: "p1".into(),
            ..Default::default()
        };
        assert!(authz.scoped(&plan, "u1", "p1").is_ok());
        assert!(authz.scoped(&plan, "u1", "p2").is_err());
        assert!(authz.scoped(&plan, "u2", "p1").is_err());
    }
}
