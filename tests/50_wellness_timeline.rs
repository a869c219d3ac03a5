mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::json;

use common::{data, TestServer};

#[tokio::test]
async fn timeline_counts_todays_tasks() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("u1").await?;
    let pet = server.create_pet(&token, "u1", "Rex").await?;
    let base = format!("/api/users/u1/pets/{}", pet);
    let tasks = format!("{}/scheduledTasks", base);

    let today = Utc::now().date_naive();
    let noon = today.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc();

    let done = data(
        server
            .post(&token, &tasks, json!({ "description": "breakfast", "scheduledDateTime": noon.to_rfc3339() }))
            .await?,
    )
    .await?;
    server
        .patch(
            &token,
            &format!("{}/{}/status?status=COMPLETED", tasks, done["taskID"].as_str().unwrap_or_default()),
            None,
        )
        .await?;
    server
        .post(
            &token,
            &tasks,
            json!({ "description": "dinner", "scheduledDateTime": (noon + Duration::hours(6)).to_rfc3339() }),
        )
        .await?;

    server
        .post(
            &token,
            &format!("{}/medicalRecords", base),
            json!({ "recordDate": noon.to_rfc3339(), "type": "CHECKUP", "clinicName": "Downtown Vets" }),
        )
        .await?;

    let path = format!("{}/wellnessTimeline?startDate={}&endDate={}", base, today, today);
    let res = server.get(&token, &path).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let timeline = data(res).await?;
    assert_eq!(timeline["progressMetrics"]["tasksCompletedToday"], 1);
    assert_eq!(timeline["progressMetrics"]["tasksTotalToday"], 2);
    assert_eq!(timeline["scheduledTasks"].as_array().map(Vec::len), Some(2));
    assert_eq!(timeline["medicalRecords"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn timeline_requires_ordered_range() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("u1").await?;
    let pet = server.create_pet(&token, "u1", "Rex").await?;
    let base = format!("/api/users/u1/pets/{}/wellnessTimeline", pet);

    let res = server.get(&token, &base).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .get(&token, &format!("{}?startDate=2025-05-02&endDate=2025-05-01", base))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
