use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PetScoped;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Reminder,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "alertID", default)]
    pub alert_id: String,
    #[serde(rename = "userID", default)]
    pub user_id: String,
    #[serde(rename = "petID", default)]
    pub pet_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<AlertType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read_status: bool,
}

impl PetScoped for Alert {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn pet_id(&self) -> &str {
        &self.pet_id
    }
}
