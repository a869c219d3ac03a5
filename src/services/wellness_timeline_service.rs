use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{MedicalRecordService, ScheduledTaskService, ServiceError, TreatmentPlanService};
use crate::database::models::{MedicalRecord, ScheduledTask, TaskStatus, TreatmentPlan};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressMetrics {
    pub tasks_completed_today: u64,
    pub tasks_total_today: u64,
}

/// Everything the wellness view shows for one pet over a date range.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessTimeline {
    pub scheduled_tasks: Vec<ScheduledTask>,
    pub medical_records: Vec<MedicalRecord>,
    pub treatment_plans: Vec<TreatmentPlan>,
    pub upcoming_tasks: Vec<ScheduledTask>,
    pub progress_metrics: ProgressMetrics,
}

#[derive(Clone)]
pub struct WellnessTimelineService {
    tasks: ScheduledTaskService,
    records: MedicalRecordService,
    plans: TreatmentPlanService,
    upcoming_limit: usize,
}

fn same_utc_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

/// Completed counts tasks finished today; the total adds tasks still pending today.
pub fn progress_metrics(tasks: &[ScheduledTask], now: DateTime<Utc>) -> ProgressMetrics {
    let completed = tasks
        .iter()
        .filter(|t| t.status == Some(TaskStatus::Completed))
        .filter(|t| t.completed_at.map_or(false, |at| same_utc_day(at, now)))
        .count() as u64;

    let pending = tasks
        .iter()
        .filter(|t| t.status == Some(TaskStatus::Pending))
        .filter(|t| t.scheduled_date_time.map_or(false, |at| same_utc_day(at, now)))
        .count() as u64;

    ProgressMetrics {
        tasks_completed_today: completed,
        tasks_total_today: completed + pending,
    }
}

impl WellnessTimelineService {
    pub fn new(
        tasks: ScheduledTaskService,
        records: MedicalRecordService,
        plans: TreatmentPlanService,
        upcoming_limit: usize,
    ) -> Self {
        Self {
            tasks,
            records,
            plans,
            upcoming_limit,
        }
    }

    pub async fn build(
        &self,
        user_id: &str,
        pet_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<WellnessTimeline, ServiceError> {
        if start > end {
            return Err(ServiceError::validation(
                "startDate",
                "startDate must not be after endDate",
            ));
        }
        let now = Utc::now();

        let scheduled_tasks = self.tasks.list_by_range(user_id, pet_id, start, end).await?;
        let upcoming_tasks = self
            .tasks
            .list_upcoming(user_id, pet_id, self.upcoming_limit, now)
            .await?;
        let medical_records = self
            .records
            .list_in_range(user_id, pet_id, start, end)
            .await?;
        let treatment_plans = self
            .plans
            .list(user_id, pet_id, None)
            .await?
            .into_iter()
            .filter(|plan| plan.overlaps(start, end))
            .collect();

        let progress_metrics = progress_metrics(&scheduled_tasks, now);
        tracing::debug!(
            "Timeline for pet {}: {} tasks in range, {}/{} done today",
            pet_id,
            scheduled_tasks.len(),
            progress_metrics.tasks_completed_today,
            progress_metrics.tasks_total_today
        );

        Ok(WellnessTimeline {
            scheduled_tasks,
            medical_records,
            treatment_plans,
            upcoming_tasks,
            progress_metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryDocumentStore;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn task(status: TaskStatus, scheduled: DateTime<Utc>, completed: Option<DateTime<Utc>>) -> ScheduledTask {
        ScheduledTask {
            status: Some(status),
            scheduled_date_time: Some(scheduled),
            completed_at: completed,
            ..Default::default()
        }
    }

    #[test]
    fn metrics_count_today_only() {
        let now = Utc.with_ymd_and_hms(2025, 4, 30, 15, 0, 0).unwrap();
        let yesterday = now - Duration::days(1);
        let tasks = vec![
            task(TaskStatus::Completed, now - Duration::hours(3), Some(now - Duration::hours(1))),
            task(TaskStatus::Completed, yesterday, Some(yesterday)),
            task(TaskStatus::Pending, now + Duration::hours(2), None),
            task(TaskStatus::Pending, yesterday, None),
            task(TaskStatus::Skipped, now, None),
        ];

        let metrics = progress_metrics(&tasks, now);
        assert_eq!(metrics.tasks_completed_today, 1);
        assert_eq!(metrics.tasks_total_today, 2);
    }

    #[test]
    fn metrics_for_empty_day_are_zero() {
        assert_eq!(progress_metrics(&[], Utc::now()), ProgressMetrics::default());
    }

    #[tokio::test]
    async fn reversed_range_is_rejected() {
        let store: Arc<dyn crate::database::DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let timeline = WellnessTimelineService::new(
            ScheduledTaskService::new(store.clone()),
            MedicalRecordService::new(store.clone()),
            TreatmentPlanService::new(store),
            5,
        );
        let now = Utc::now();
        let err = timeline
            .build("u1", "p1", now, now - Duration::days(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "startDate", .. }));
    }

    #[tokio::test]
    async fn timeline_collects_range_and_upcoming() {
        let store: Arc<dyn crate::database::DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let tasks = ScheduledTaskService::new(store.clone());
        let plans = TreatmentPlanService::new(store.clone());
        let timeline = WellnessTimelineService::new(
            tasks.clone(),
            MedicalRecordService::new(store.clone()),
            plans.clone(),
            1,
        );

        let now = Utc::now();
        for offset in [-48, 1, 2, 72] {
            tasks
                .create(
                    "u1",
                    "p1",
                    ScheduledTask {
                        scheduled_date_time: Some(now + Duration::hours(offset)),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
        plans
            .create(
                "u1",
                "p1",
                TreatmentPlan {
                    start_date: Some(now - Duration::days(10)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let view = timeline
            .build("u1", "p1", now - Duration::hours(1), now + Duration::hours(3))
            .await
            .unwrap();
        assert_eq!(view.scheduled_tasks.len(), 2);
        assert_eq!(view.upcoming_tasks.len(), 1);
        assert_eq!(
            view.upcoming_tasks[0].scheduled_date_time,
            Some(now + Duration::hours(1))
        );
        assert_eq!(view.treatment_plans.len(), 1);
        assert!(view.medical_records.is_empty());
    }
}
