use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A care provider or service the user keeps on file (vet, groomer, pharmacy).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(rename = "resourceID", default)]
    pub resource_id: String,
    #[serde(rename = "userID", default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(default)]
    pub contact_details: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
