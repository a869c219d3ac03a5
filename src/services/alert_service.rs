use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{missing_as, paths, ServiceError};
use crate::database::models::Alert;
use crate::database::{new_document_id, DocumentStore, Query, Repository};

#[derive(Clone)]
pub struct AlertService {
    alerts: Repository<Alert>,
}

impl AlertService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            alerts: Repository::new(store),
        }
    }

    pub async fn create(&self, user_id: &str, pet_id: &str, mut alert: Alert) -> Result<Alert, ServiceError> {
        alert.alert_id = new_document_id();
        alert.user_id = user_id.to_string();
        alert.pet_id = pet_id.to_string();
        alert.created_at.get_or_insert_with(Utc::now);
        alert.read_status = false;

        let path = paths::alerts(user_id, pet_id)?.doc(&alert.alert_id)?;
        self.alerts.set(&path, &alert).await?;
        Ok(alert)
    }

    /// Newest first.
    pub async fn list(&self, user_id: &str, pet_id: &str, unread_only: bool) -> Result<Vec<Alert>, ServiceError> {
        let mut query = Query::new();
        if unread_only {
            query = query.where_eq("readStatus", false);
        }
        let query = query.order_by_time("createdAt", true);
        Ok(self
            .alerts
            .select_any(&paths::alerts(user_id, pet_id)?, &query)
            .await?)
    }

    pub async fn get(&self, user_id: &str, pet_id: &str, alert_id: &str) -> Result<Alert, ServiceError> {
        let path = paths::alerts(user_id, pet_id)?.doc(alert_id)?;
        self.alerts
            .get(&path)
            .await?
            .ok_or(ServiceError::NotFound("Alert"))
    }

    pub async fn mark_read(&self, user_id: &str, pet_id: &str, alert_id: &str) -> Result<Alert, ServiceError> {
        let path = paths::alerts(user_id, pet_id)?.doc(alert_id)?;
        let mut fields = Map::new();
        fields.insert("readStatus".to_string(), Value::Bool(true));
        self.alerts
            .update_fields(&path, fields)
            .await
            .map_err(missing_as("Alert"))?;
        self.get(user_id, pet_id, alert_id).await
    }

    pub async fn delete(&self, user_id: &str, pet_id: &str, alert_id: &str) -> Result<(), ServiceError> {
        let path = paths::alerts(user_id, pet_id)?.doc(alert_id)?;
        if !self.alerts.exists(&path).await? {
            return Err(ServiceError::NotFound("Alert"));
        }
        self.alerts.delete(&path).await?;
        Ok(())
    }
}
