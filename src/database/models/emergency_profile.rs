use serde::{Deserialize, Serialize};

/// Single emergency profile per pet, stored under a fixed document id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyProfile {
    #[serde(rename = "emergencyProfileID", default)]
    pub emergency_profile_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

impl EmergencyProfile {
    pub const DOCUMENT_ID: &'static str = "profile";
}
