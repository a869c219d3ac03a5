use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::{paths, ServiceError};
use crate::database::models::MedicalRecord;
use crate::database::{new_document_id, DocumentStore, Query, Repository};

#[derive(Clone)]
pub struct MedicalRecordService {
    records: Repository<MedicalRecord>,
}

impl MedicalRecordService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            records: Repository::new(store),
        }
    }

    pub async fn create(&self, user_id: &str, pet_id: &str, mut record: MedicalRecord) -> Result<MedicalRecord, ServiceError> {
        record.record_id = new_document_id();
        let path = paths::medical_records(user_id, pet_id)?.doc(&record.record_id)?;
        self.records.set(&path, &record).await?;
        Ok(record)
    }

    pub async fn list(&self, user_id: &str, pet_id: &str) -> Result<Vec<MedicalRecord>, ServiceError> {
        let collection = paths::medical_records(user_id, pet_id)?;
        Ok(self.records.select_any(&collection, &Query::new()).await?)
    }

    /// Records dated inside `[start, end]`, oldest first. Undated records are left out.
    pub async fn list_in_range(
        &self,
        user_id: &str,
        pet_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MedicalRecord>, ServiceError> {
        let collection = paths::medical_records(user_id, pet_id)?;
        let query = Query::new()
            .at_or_after("recordDate", start)
            .at_or_before("recordDate", end)
            .order_by_time("recordDate", false);
        Ok(self.records.select_any(&collection, &query).await?)
    }

    pub async fn get(&self, user_id: &str, pet_id: &str, record_id: &str) -> Result<MedicalRecord, ServiceError> {
        let path = paths::medical_records(user_id, pet_id)?.doc(record_id)?;
        self.records
            .get(&path)
            .await?
            .ok_or(ServiceError::NotFound("Medical record"))
    }

    pub async fn update(
        &self,
        user_id: &str,
        pet_id: &str,
        record_id: &str,
        mut record: MedicalRecord,
    ) -> Result<MedicalRecord, ServiceError> {
        let path = paths::medical_records(user_id, pet_id)?.doc(record_id)?;
        if !self.records.exists(&path).await? {
            return Err(ServiceError::NotFound("Medical record"));
        }
        record.record_id = record_id.to_string();
        self.records.set(&path, &record).await?;
        Ok(record)
    }

    pub async fn delete(&self, user_id: &str, pet_id: &str, record_id: &str) -> Result<(), ServiceError> {
        let path = paths::medical_records(user_id, pet_id)?.doc(record_id)?;
        if !self.records.exists(&path).await? {
            return Err(ServiceError::NotFound("Medical record"));
        }
        self.records.delete(&path).await?;
        Ok(())
    }
}
