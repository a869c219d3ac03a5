use serde::Deserialize;
use std::sync::Arc;

use super::{paths, ServiceError};
use crate::database::models::User;
use crate::database::{DocumentStore, Query, Repository};

/// Editable account fields. A full replace writes all three.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Profile edit: only the fields present are changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    users: Repository<User>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: Repository::new(store),
        }
    }

    pub async fn get_by_id(&self, user_id: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.users.get(&paths::user(user_id)?).await?)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        if email.is_empty() {
            return Ok(None);
        }
        let query = Query::new().where_eq("email", email);
        Ok(self.users.select_one(&paths::users(), &query).await?)
    }

    /// Create or replace the user document.
    pub async fn save(&self, user: &User) -> Result<(), ServiceError> {
        if user.user_id.trim().is_empty() {
            return Err(ServiceError::validation("userID", "User id is required"));
        }
        self.ensure_email_free(&user.email, &user.user_id).await?;
        self.users.set(&paths::user(&user.user_id)?, user).await?;
        tracing::debug!("Saved user {}", user.user_id);
        Ok(())
    }

    /// Replace the editable fields of an existing user, keeping the stored password hash.
    pub async fn replace(&self, user_id: &str, details: UserDetails) -> Result<User, ServiceError> {
        let existing = self
            .get_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        let user = User {
            user_id: user_id.to_string(),
            name: details.name,
            email: details.email,
            phone: details.phone,
            password: existing.password,
        };
        self.save(&user).await?;
        Ok(user)
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<User, ServiceError> {
        let mut user = self
            .get_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(phone) = update.phone {
            user.phone = phone;
        }

        self.save(&user).await?;
        Ok(user)
    }

    /// Removes the user document only. Pets and other nested documents stay behind.
    pub async fn delete(&self, user_id: &str) -> Result<(), ServiceError> {
        let path = paths::user(user_id)?;
        if !self.users.exists(&path).await? {
            return Err(ServiceError::NotFound("User"));
        }
        self.users.delete(&path).await?;
        Ok(())
    }

    async fn ensure_email_free(&self, email: &str, owner: &str) -> Result<(), ServiceError> {
        match self.get_by_email(email).await? {
            Some(other) if other.user_id != owner => {
                Err(ServiceError::Rejected("Email is already in use".to_string()))
            }
            _ => Ok(()),
        }
    }
}
