use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PetScoped;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Active,
    Completed,
    Cancelled,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Active => "ACTIVE",
            PlanStatus::Completed => "COMPLETED",
            PlanStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentPlan {
    #[serde(rename = "planID", default)]
    pub plan_id: String,
    #[serde(rename = "userID", default)]
    pub user_id: String,
    #[serde(rename = "petID", default)]
    pub pet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PlanStatus>,
    /// 0 to 100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_percentage: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TreatmentPlan {
    /// Whether the plan's active interval touches `[start, end]`. A plan without an
    /// end date stays open; one without a start date is treated as always started.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let begins_in_time = self.start_date.map_or(true, |s| s <= end);
        let still_running = self.end_date.map_or(true, |e| e >= start);
        begins_in_time && still_running
    }
}

impl PetScoped for TreatmentPlan {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn pet_id(&self) -> &str {
        &self.pet_id
    }
}
