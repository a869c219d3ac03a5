pub mod alert;
pub mod emergency_profile;
pub mod medical_record;
pub mod pet;
pub mod resource;
pub mod scheduled_task;
pub mod treatment_plan;
pub mod user;

pub use alert::{Alert, AlertType, Severity};
pub use emergency_profile::EmergencyProfile;
pub use medical_record::MedicalRecord;
pub use pet::Pet;
pub use resource::Resource;
pub use scheduled_task::{ScheduledTask, TaskStatus, TaskType};
pub use treatment_plan::{PlanStatus, TreatmentPlan};
pub use user::{User, UserProfile};

/// Entities that live under one pet and record who they belong to.
pub trait PetScoped {
    fn user_id(&self) -> &str;
    fn pet_id(&self) -> &str;
}

/// Treat empty strings from clients as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
