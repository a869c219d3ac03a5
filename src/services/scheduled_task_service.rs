use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{missing_as, paths, ServiceError};
use crate::database::models::{ScheduledTask, TaskStatus};
use crate::database::repository::to_fields;
use crate::database::{new_document_id, DocumentStore, Query, Repository};

const SCHEDULED_AT: &str = "scheduledDateTime";

#[derive(Clone)]
pub struct ScheduledTaskService {
    tasks: Repository<ScheduledTask>,
}

/// First and last instant of a UTC calendar day.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1) - Duration::microseconds(1))
}

/// Fields written for a status change. Only COMPLETED carries a completion time.
fn status_fields(status: TaskStatus, now: DateTime<Utc>) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("status".to_string(), Value::from(status.as_str()));
    let completed_at = match status {
        TaskStatus::Completed => Value::from(now.to_rfc3339()),
        _ => Value::Null,
    };
    fields.insert("completedAt".to_string(), completed_at);
    fields
}

impl ScheduledTaskService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            tasks: Repository::new(store),
        }
    }

    /// New tasks start PENDING unless a status is given.
    pub async fn create(&self, user_id: &str, pet_id: &str, mut task: ScheduledTask) -> Result<ScheduledTask, ServiceError> {
        task.task_id = new_document_id();
        task.user_id = user_id.to_string();
        task.pet_id = pet_id.to_string();

        let status = *task.status.get_or_insert(TaskStatus::Pending);
        task.completed_at = match status {
            TaskStatus::Completed => task.completed_at.or_else(|| Some(Utc::now())),
            _ => None,
        };

        let path = paths::scheduled_tasks(user_id, pet_id)?.doc(&task.task_id)?;
        self.tasks.set(&path, &task).await?;
        tracing::debug!("Created task {} for pet {}", task.task_id, pet_id);
        Ok(task)
    }

    pub async fn get(&self, user_id: &str, pet_id: &str, task_id: &str) -> Result<ScheduledTask, ServiceError> {
        let path = paths::scheduled_tasks(user_id, pet_id)?.doc(task_id)?;
        self.tasks
            .get(&path)
            .await?
            .ok_or(ServiceError::NotFound("Scheduled task"))
    }

    /// All tasks with a schedule time, earliest first.
    pub async fn list_all(&self, user_id: &str, pet_id: &str) -> Result<Vec<ScheduledTask>, ServiceError> {
        let query = Query::new().order_by_time(SCHEDULED_AT, false);
        Ok(self
            .tasks
            .select_any(&paths::scheduled_tasks(user_id, pet_id)?, &query)
            .await?)
    }

    /// Tasks scheduled within `[start, end]`, earliest first.
    pub async fn list_by_range(
        &self,
        user_id: &str,
        pet_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ScheduledTask>, ServiceError> {
        let query = Query::new()
            .at_or_after(SCHEDULED_AT, start)
            .at_or_before(SCHEDULED_AT, end)
            .order_by_time(SCHEDULED_AT, false);
        Ok(self
            .tasks
            .select_any(&paths::scheduled_tasks(user_id, pet_id)?, &query)
            .await?)
    }

    pub async fn list_by_date(&self, user_id: &str, pet_id: &str, date: NaiveDate) -> Result<Vec<ScheduledTask>, ServiceError> {
        let (start, end) = day_bounds(date);
        self.list_by_range(user_id, pet_id, start, end).await
    }

    /// Next `limit` PENDING tasks scheduled at or after `now`.
    pub async fn list_upcoming(
        &self,
        user_id: &str,
        pet_id: &str,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduledTask>, ServiceError> {
        let query = Query::new()
            .where_eq("status", TaskStatus::Pending.as_str())
            .at_or_after(SCHEDULED_AT, now)
            .order_by_time(SCHEDULED_AT, false)
            .limit(limit);
        Ok(self
            .tasks
            .select_any(&paths::scheduled_tasks(user_id, pet_id)?, &query)
            .await?)
    }

    /// Merge the supplied fields into an existing task.
    pub async fn update(
        &self,
        user_id: &str,
        pet_id: &str,
        task_id: &str,
        mut task: ScheduledTask,
    ) -> Result<ScheduledTask, ServiceError> {
        task.task_id = task_id.to_string();
        task.user_id = user_id.to_string();
        task.pet_id = pet_id.to_string();

        let path = paths::scheduled_tasks(user_id, pet_id)?.doc(task_id)?;
        let mut fields = to_fields(&path, &task)?;
        match task.status {
            Some(status) => {
                let completed_at = task.completed_at.unwrap_or_else(Utc::now);
                fields.extend(status_fields(status, completed_at));
            }
            None if fields.contains_key("completedAt") => {
                // completedAt only sticks to a task that is already COMPLETED
                let current = self.get(user_id, pet_id, task_id).await?;
                if current.status != Some(TaskStatus::Completed) {
                    fields.remove("completedAt");
                }
            }
            None => {}
        }

        self.tasks
            .update_fields(&path, fields)
            .await
            .map_err(missing_as("Scheduled task"))?;
        self.get(user_id, pet_id, task_id).await
    }

    /// Set the status. COMPLETED stamps `completedAt`; any other status clears it.
    pub async fn update_status(
        &self,
        user_id: &str,
        pet_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<ScheduledTask, ServiceError> {
        let path = paths::scheduled_tasks(user_id, pet_id)?.doc(task_id)?;
        self.tasks
            .update_fields(&path, status_fields(status, Utc::now()))
            .await
            .map_err(missing_as("Scheduled task"))?;
        tracing::debug!("Task {} is now {}", task_id, status.as_str());
        self.get(user_id, pet_id, task_id).await
    }

    pub async fn delete(&self, user_id: &str, pet_id: &str, task_id: &str) -> Result<(), ServiceError> {
        let path = paths::scheduled_tasks(user_id, pet_id)?.doc(task_id)?;
        if !self.tasks.exists(&path).await? {
            return Err(ServiceError::NotFound("Scheduled task"));
        }
        self.tasks.delete(&path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::TaskType;
    use crate::database::MemoryDocumentStore;
    use chrono::TimeZone;

    fn service() -> ScheduledTaskService {
        ScheduledTaskService::new(Arc::new(MemoryDocumentStore::new()))
    }

    fn task_at(at: DateTime<Utc>) -> ScheduledTask {
        ScheduledTask {
            task_type: Some(TaskType::Walk),
            description: Some("Morning walk".into()),
            scheduled_date_time: Some(at),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_defaults_to_pending() {
        let tasks = service();
        let created = tasks
            .create("u1", "p1", task_at(Utc::now()))
            .await
            .unwrap();
        assert_eq!(created.status, Some(TaskStatus::Pending));
        assert!(created.completed_at.is_none());
        assert_eq!(created.user_id, "u1");
        assert_eq!(created.pet_id, "p1");
    }

    #[tokio::test]
    async fn completing_stamps_and_reopening_clears() {
        let tasks = service();
        let created = tasks.create("u1", "p1", task_at(Utc::now())).await.unwrap();

        let done = tasks
            .update_status("u1", "p1", &created.task_id, TaskStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, Some(TaskStatus::Completed));
        assert!(done.completed_at.is_some());

        let skipped = tasks
            .update_status("u1", "p1", &created.task_id, TaskStatus::Skipped)
            .await
            .unwrap();
        assert_eq!(skipped.status, Some(TaskStatus::Skipped));
        assert!(skipped.completed_at.is_none());
    }

    #[tokio::test]
    async fn status_of_missing_task_is_not_found() {
        let err = service()
            .update_status("u1", "p1", "nope", TaskStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("Scheduled task")));
    }

    #[tokio::test]
    async fn update_merges_supplied_fields() {
        let tasks = service();
        let created = tasks.create("u1", "p1", task_at(Utc::now())).await.unwrap();

        let updated = tasks
            .update(
                "u1",
                "p1",
                &created.task_id,
                ScheduledTask {
                    notes: Some("Use the long leash".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.notes.as_deref(), Some("Use the long leash"));
        assert_eq!(updated.description.as_deref(), Some("Morning walk"));
        assert_eq!(updated.status, Some(TaskStatus::Pending));
    }

    #[tokio::test]
    async fn update_ignores_completion_time_on_open_tasks() {
        let tasks = service();
        let created = tasks.create("u1", "p1", task_at(Utc::now())).await.unwrap();

        let updated = tasks
            .update(
                "u1",
                "p1",
                &created.task_id,
                ScheduledTask {
                    completed_at: Some(Utc::now()),
                    notes: Some("done early?".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, Some(TaskStatus::Pending));
        assert!(updated.completed_at.is_none());
        assert_eq!(updated.notes.as_deref(), Some("done early?"));

        let reopened = tasks
            .update(
                "u1",
                "p1",
                &created.task_id,
                ScheduledTask {
                    status: Some(TaskStatus::Skipped),
                    completed_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(reopened.status, Some(TaskStatus::Skipped));
        assert!(reopened.completed_at.is_none());
    }

    #[tokio::test]
    async fn update_can_correct_completion_time_of_completed_task() {
        let tasks = service();
        let created = tasks.create("u1", "p1", task_at(Utc::now())).await.unwrap();
        tasks
            .update_status("u1", "p1", &created.task_id, TaskStatus::Completed)
            .await
            .unwrap();

        let at = Utc.with_ymd_and_hms(2025, 4, 30, 8, 15, 0).unwrap();
        let corrected = tasks
            .update(
                "u1",
                "p1",
                &created.task_id,
                ScheduledTask {
                    completed_at: Some(at),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(corrected.status, Some(TaskStatus::Completed));
        assert_eq!(corrected.completed_at, Some(at));
    }

    #[tokio::test]
    async fn listings_filter_and_order_by_schedule() {
        let tasks = service();
        let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2025, 4, d, h, 0, 0).unwrap();
        for (d, h) in [(30, 18), (30, 7), (29, 23), (1, 9)] {
            tasks.create("u1", "p1", task_at(at(d, h))).await.unwrap();
        }

        let day = tasks
            .list_by_date("u1", "p1", NaiveDate::from_ymd_opt(2025, 4, 30).unwrap())
            .await
            .unwrap();
        let hours: Vec<_> = day
            .iter()
            .map(|t| t.scheduled_date_time.unwrap())
            .collect();
        assert_eq!(hours, vec![at(30, 7), at(30, 18)]);

        let all = tasks.list_all("u1", "p1").await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].scheduled_date_time, Some(at(1, 9)));

        let upcoming = tasks
            .list_upcoming("u1", "p1", 2, at(29, 0))
            .await
            .unwrap();
        let times: Vec<_> = upcoming
            .iter()
            .map(|t| t.scheduled_date_time.unwrap())
            .collect();
        assert_eq!(times, vec![at(29, 23), at(30, 7)]);
    }

    #[tokio::test]
    async fn upcoming_skips_non_pending() {
        let tasks = service();
        let later = Utc::now() + Duration::hours(2);
        let created = tasks.create("u1", "p1", task_at(later)).await.unwrap();
        tasks
            .update_status("u1", "p1", &created.task_id, TaskStatus::Skipped)
            .await
            .unwrap();

        let upcoming = tasks.list_upcoming("u1", "p1", 5, Utc::now()).await.unwrap();
        assert!(upcoming.is_empty());
    }

    #[test]
    fn day_bounds_cover_whole_day() {
        let (start, end) = day_bounds(NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 4, 30, 0, 0, 0).unwrap());
        assert!(end < Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap());
        assert!(end > Utc.with_ymd_and_hms(2025, 4, 30, 23, 59, 59).unwrap());
    }
}
