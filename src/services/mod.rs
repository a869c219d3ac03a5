pub mod alert_service;
pub mod emergency_profile_service;
pub mod medical_record_service;
pub mod paths;
pub mod pet_service;
pub mod resource_service;
pub mod scheduled_task_service;
pub mod treatment_plan_service;
pub mod user_service;
pub mod wellness_timeline_service;

use thiserror::Error;

use crate::database::StoreError;

pub use alert_service::AlertService;
pub use emergency_profile_service::EmergencyProfileService;
pub use medical_record_service::MedicalRecordService;
pub use pet_service::PetService;
pub use resource_service::ResourceService;
pub use scheduled_task_service::ScheduledTaskService;
pub use treatment_plan_service::TreatmentPlanService;
pub use user_service::{ProfileUpdate, UserDetails, UserService};
pub use wellness_timeline_service::{ProgressMetrics, WellnessTimeline, WellnessTimelineService};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// Request is well formed but conflicts with stored state
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Map a store `NotFound` from an update onto the entity that was missing.
pub(crate) fn missing_as(what: &'static str) -> impl Fn(StoreError) -> ServiceError {
    move |err| match err {
        StoreError::NotFound(_) => ServiceError::NotFound(what),
        other => ServiceError::Store(other),
    }
}
