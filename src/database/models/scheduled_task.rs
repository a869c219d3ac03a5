use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PetScoped;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    Medication,
    Feeding,
    Walk,
    VetVisit,
    Grooming,
    Appointment,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Completed,
    Skipped,
    Overdue,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Skipped => "SKIPPED",
            TaskStatus::Overdue => "OVERDUE",
        }
    }
}

/// A care task scheduled for one pet. Every field except the ids is optional so
/// that updates can carry only what changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    #[serde(rename = "taskID", default)]
    pub task_id: String,
    #[serde(rename = "userID", default)]
    pub user_id: String,
    #[serde(rename = "petID", default)]
    pub pet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Opaque recurrence description, stored as given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl PetScoped for ScheduledTask {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn pet_id(&self) -> &str {
        &self.pet_id
    }
}
