use std::sync::Arc;

use super::{paths, ServiceError};
use crate::database::models::Resource;
use crate::database::{new_document_id, DocumentStore, Query, Repository};

#[derive(Clone)]
pub struct ResourceService {
    resources: Repository<Resource>,
}

impl ResourceService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            resources: Repository::new(store),
        }
    }

    pub async fn create(&self, user_id: &str, mut resource: Resource) -> Result<Resource, ServiceError> {
        if resource.name.trim().is_empty() {
            return Err(ServiceError::validation("name", "Resource name is required"));
        }
        resource.resource_id = new_document_id();
        resource.user_id = user_id.to_string();
        let path = paths::resources(user_id)?.doc(&resource.resource_id)?;
        self.resources.set(&path, &resource).await?;
        Ok(resource)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Resource>, ServiceError> {
        Ok(self
            .resources
            .select_any(&paths::resources(user_id)?, &Query::new())
            .await?)
    }

    pub async fn get(&self, user_id: &str, resource_id: &str) -> Result<Resource, ServiceError> {
        let path = paths::resources(user_id)?.doc(resource_id)?;
        self.resources
            .get(&path)
            .await?
            .ok_or(ServiceError::NotFound("Resource"))
    }

    pub async fn update(&self, user_id: &str, resource_id: &str, mut resource: Resource) -> Result<Resource, ServiceError> {
        let path = paths::resources(user_id)?.doc(resource_id)?;
        if !self.resources.exists(&path).await? {
            return Err(ServiceError::NotFound("Resource"));
        }
        resource.resource_id = resource_id.to_string();
        resource.user_id = user_id.to_string();
        self.resources.set(&path, &resource).await?;
        Ok(resource)
    }

    pub async fn delete(&self, user_id: &str, resource_id: &str) -> Result<(), ServiceError> {
        let path = paths::resources(user_id)?.doc(resource_id)?;
        if !self.resources.exists(&path).await? {
            return Err(ServiceError::NotFound("Resource"));
        }
        self.resources.delete(&path).await?;
        Ok(())
    }
}
