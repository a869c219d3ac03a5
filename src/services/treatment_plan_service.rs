use serde_json::{Map, Value};
use std::sync::Arc;

use super::{missing_as, paths, ServiceError};
use crate::database::models::{PlanStatus, TreatmentPlan};
use crate::database::repository::to_fields;
use crate::database::{new_document_id, DocumentStore, Query, Repository};

#[derive(Clone)]
pub struct TreatmentPlanService {
    plans: Repository<TreatmentPlan>,
}

fn check_progress(progress: i64) -> Result<(), ServiceError> {
    if (0..=100).contains(&progress) {
        Ok(())
    } else {
        Err(ServiceError::validation(
            "progressPercentage",
            "Progress must be between 0 and 100",
        ))
    }
}

impl TreatmentPlanService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            plans: Repository::new(store),
        }
    }

    /// New plans start ACTIVE at 0% unless told otherwise.
    pub async fn create(&self, user_id: &str, pet_id: &str, mut plan: TreatmentPlan) -> Result<TreatmentPlan, ServiceError> {
        if let Some(progress) = plan.progress_percentage {
            check_progress(progress)?;
        }
        plan.plan_id = new_document_id();
        plan.user_id = user_id.to_string();
        plan.pet_id = pet_id.to_string();
        plan.status.get_or_insert(PlanStatus::Active);
        plan.progress_percentage.get_or_insert(0);

        let path = paths::treatment_plans(user_id, pet_id)?.doc(&plan.plan_id)?;
        self.plans.set(&path, &plan).await?;
        Ok(plan)
    }

    pub async fn get(&self, user_id: &str, pet_id: &str, plan_id: &str) -> Result<TreatmentPlan, ServiceError> {
        let path = paths::treatment_plans(user_id, pet_id)?.doc(plan_id)?;
        self.plans
            .get(&path)
            .await?
            .ok_or(ServiceError::NotFound("Treatment plan"))
    }

    pub async fn list(&self, user_id: &str, pet_id: &str, status: Option<PlanStatus>) -> Result<Vec<TreatmentPlan>, ServiceError> {
        let query = match status {
            Some(status) => Query::new().where_eq("status", status.as_str()),
            None => Query::new(),
        };
        Ok(self
            .plans
            .select_any(&paths::treatment_plans(user_id, pet_id)?, &query)
            .await?)
    }

    /// Merge the supplied fields into an existing plan.
    pub async fn update(
        &self,
        user_id: &str,
        pet_id: &str,
        plan_id: &str,
        mut plan: TreatmentPlan,
    ) -> Result<TreatmentPlan, ServiceError> {
        if let Some(progress) = plan.progress_percentage {
            check_progress(progress)?;
        }
        plan.plan_id = plan_id.to_string();
        plan.user_id = user_id.to_string();
        plan.pet_id = pet_id.to_string();

        let path = paths::treatment_plans(user_id, pet_id)?.doc(plan_id)?;
        self.plans
            .update_fields(&path, to_fields(&path, &plan)?)
            .await
            .map_err(missing_as("Treatment plan"))?;
        self.get(user_id, pet_id, plan_id).await
    }

    /// Out-of-range values are refused before anything is written.
    pub async fn update_progress(
        &self,
        user_id: &str,
        pet_id: &str,
        plan_id: &str,
        progress: i64,
    ) -> Result<TreatmentPlan, ServiceError> {
        check_progress(progress)?;

        let path = paths::treatment_plans(user_id, pet_id)?.doc(plan_id)?;
        let mut fields = Map::new();
        fields.insert("progressPercentage".to_string(), Value::from(progress));
        self.plans
            .update_fields(&path, fields)
            .await
            .map_err(missing_as("Treatment plan"))?;
        self.get(user_id, pet_id, plan_id).await
    }

    pub async fn delete(&self, user_id: &str, pet_id: &str, plan_id: &str) -> Result<(), ServiceError> {
        let path = paths::treatment_plans(user_id, pet_id)?.doc(plan_id)?;
        if !self.plans.exists(&path).await? {
            return Err(ServiceError::NotFound("Treatment plan"));
        }
        self.plans.delete(&path).await?;
        Ok(())
    }
}
