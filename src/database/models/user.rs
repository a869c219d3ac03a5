use serde::{Deserialize, Serialize};

/// Stored account. `password` holds an argon2 hash, or is empty for accounts
/// that only sign in through the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "userID", default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

/// What the API returns for a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name,
            email: user.email,
            phone: user.phone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_hides_password() {
        let user = User {
            user_id: "u1".into(),
            name: "Sam".into(),
            email: "sam@example.com".into(),
            phone: String::new(),
            password: "$argon2id$secret".into(),
        };
        let value = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert_eq!(
            value,
            json!({"userID": "u1", "name": "Sam", "email": "sam@example.com", "phone": ""})
        );
    }
}
