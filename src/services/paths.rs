//! Document locations. Every entity is scoped by its place in the tree, never by a query filter.

use crate::database::{CollectionPath, DocumentPath, StoreError};
use crate::database::models::EmergencyProfile;

pub fn users() -> CollectionPath {
    CollectionPath::root("users")
}

pub fn user(user_id: &str) -> Result<DocumentPath, StoreError> {
    users().doc(user_id)
}

pub fn pets(user_id: &str) -> Result<CollectionPath, StoreError> {
    Ok(user(user_id)?.collection("pets"))
}

pub fn pet(user_id: &str, pet_id: &str) -> Result<DocumentPath, StoreError> {
    pets(user_id)?.doc(pet_id)
}

pub fn medical_records(user_id: &str, pet_id: &str) -> Result<CollectionPath, StoreError> {
    Ok(pet(user_id, pet_id)?.collection("medicalRecords"))
}

pub fn emergency_profile(user_id: &str, pet_id: &str) -> Result<DocumentPath, StoreError> {
    pet(user_id, pet_id)?
        .collection("emergencyProfile")
        .doc(EmergencyProfile::DOCUMENT_ID)
}

pub fn scheduled_tasks(user_id: &str, pet_id: &str) -> Result<CollectionPath, StoreError> {
    Ok(pet(user_id, pet_id)?.collection("scheduledTasks"))
}

pub fn treatment_plans(user_id: &str, pet_id: &str) -> Result<CollectionPath, StoreError> {
    Ok(pet(user_id, pet_id)?.collection("treatmentPlans"))
}

pub fn alerts(user_id: &str, pet_id: &str) -> Result<CollectionPath, StoreError> {
    Ok(pet(user_id, pet_id)?.collection("alerts"))
}

pub fn resources(user_id: &str) -> Result<CollectionPath, StoreError> {
    Ok(user(user_id)?.collection("resources"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_nest_under_owner() {
        assert_eq!(
            scheduled_tasks("u1", "p1").unwrap().as_str(),
            "users/u1/pets/p1/scheduledTasks"
        );
        assert_eq!(
            emergency_profile("u1", "p1").unwrap().to_string(),
            "users/u1/pets/p1/emergencyProfile/profile"
        );
        assert_eq!(resources("u1").unwrap().as_str(), "users/u1/resources");
    }

    #[test]
    fn ids_cannot_climb_out_of_scope() {
        assert!(pet("u1", "p1/../../u2").is_err());
        assert!(pets("").is_err());
    }
}
