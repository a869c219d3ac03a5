use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    #[serde(rename = "petID", default)]
    pub pet_id: String,
    #[serde(rename = "ownerID", default)]
    pub owner_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub allergies: Vec<String>,
    /// Inline photo, standard base64
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

impl Pet {
    /// An empty image is the same as no image.
    pub fn normalized(mut self) -> Self {
        self.image_base64 = super::non_empty(self.image_base64);
        self
    }
}
