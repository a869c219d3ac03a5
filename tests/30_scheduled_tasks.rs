mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::json;

use common::{data, TestServer};

#[tokio::test]
async fn new_task_is_pending_until_completed() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("u1").await?;
    let pet = server.create_pet(&token, "u1", "Rex").await?;
    let tasks = format!("/api/users/u1/pets/{}/scheduledTasks", pet);

    let res = server
        .post(
            &token,
            &tasks,
            json!({
                "taskType": "MEDICATION",
                "description": "Heartworm pill",
                "scheduledDateTime": (Utc::now() + Duration::hours(2)).to_rfc3339()
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let task = data(res).await?;
    assert_eq!(task["status"], "PENDING");
    assert!(task.get("completedAt").is_none());

    let task_id = task["taskID"].as_str().unwrap_or_default().to_string();
    let task_path = format!("{}/{}", tasks, task_id);

    let res = server
        .patch(&token, &format!("{}/status?status=COMPLETED", task_path), None)
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let task = data(server.get(&token, &task_path).await?).await?;
    assert_eq!(task["status"], "COMPLETED");
    assert!(task["completedAt"].is_string());

    // Moving off COMPLETED clears the completion time
    server
        .patch(&token, &format!("{}/status?status=PENDING", task_path), None)
        .await?;
    let task = data(server.get(&token, &task_path).await?).await?;
    assert_eq!(task["status"], "PENDING");
    assert!(task.get("completedAt").is_none());
    Ok(())
}

#[tokio::test]
async fn unknown_status_is_bad_request() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("u1").await?;
    let pet = server.create_pet(&token, "u1", "Rex").await?;
    let tasks = format!("/api/users/u1/pets/{}/scheduledTasks", pet);

    let task = data(server.post(&token, &tasks, json!({ "description": "walk" })).await?).await?;
    let path = format!("{}/{}/status?status=DONE", tasks, task["taskID"].as_str().unwrap_or_default());

    let res = server.patch(&token, &path, None).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn list_filters_by_date_and_range() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("u1").await?;
    let pet = server.create_pet(&token, "u1", "Rex").await?;
    let tasks = format!("/api/users/u1/pets/{}/scheduledTasks", pet);

    for at in [
        "2025-04-29T09:00:00Z",
        "2025-04-30T08:00:00Z",
        "2025-04-30T20:00:00Z",
        "2025-05-02T12:00:00Z",
    ] {
        server
            .post(&token, &tasks, json!({ "description": at, "scheduledDateTime": at }))
            .await?;
    }

    let day = data(server.get(&token, &format!("{}?date=2025-04-30", tasks)).await?).await?;
    let day = day.as_array().cloned().unwrap_or_default();
    assert_eq!(day.len(), 2);
    assert_eq!(day[0]["description"], "2025-04-30T08:00:00Z");

    let range = data(
        server
            .get(&token, &format!("{}?startDate=2025-04-29&endDate=2025-04-30", tasks))
            .await?,
    )
    .await?;
    assert_eq!(range.as_array().map(Vec::len), Some(3));

    let all = data(server.get(&token, &tasks).await?).await?;
    assert_eq!(all.as_array().map(Vec::len), Some(4));

    let res = server
        .get(&token, &format!("{}?startDate=2025-04-29", tasks))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn upcoming_returns_next_pending_in_order() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("u1").await?;
    let pet = server.create_pet(&token, "u1", "Rex").await?;
    let tasks = format!("/api/users/u1/pets/{}/scheduledTasks", pet);

    let now = Utc::now();
    for (hours, status) in [(-1, "PENDING"), (3, "PENDING"), (1, "PENDING"), (2, "SKIPPED")] {
        server
            .post(
                &token,
                &tasks,
                json!({
                    "description": format!("{}h", hours),
                    "status": status,
                    "scheduledDateTime": (now + Duration::hours(hours)).to_rfc3339()
                }),
            )
            .await?;
    }

    let upcoming = data(server.get(&token, &format!("{}/upcoming?limit=5", tasks)).await?).await?;
    let names: Vec<_> = upcoming
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|t| t["description"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["1h", "3h"]);

    let one = data(server.get(&token, &format!("{}/upcoming?limit=1", tasks)).await?).await?;
    assert_eq!(one.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn update_merges_and_delete_removes() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("u1").await?;
    let pet = server.create_pet(&token, "u1", "Rex").await?;
    let tasks = format!("/api/users/u1/pets/{}/scheduledTasks", pet);

    let task = data(
        server
            .post(&token, &tasks, json!({ "description": "walk", "notes": "leash" }))
            .await?,
    )
    .await?;
    let path = format!("{}/{}", tasks, task["taskID"].as_str().unwrap_or_default());

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&token)
        .json(&json!({ "description": "long walk" }))
        .send()
        .await?;
    let updated = data(res).await?;
    assert_eq!(updated["description"], "long walk");
    assert_eq!(updated["notes"], "leash");

    let res = server.client.delete(server.url(&path)).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(server.get(&token, &path).await?.status(), StatusCode::NOT_FOUND);

    let res = server.client.delete(server.url(&path)).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn completion_time_only_sticks_to_completed_tasks() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("u1").await?;
    let pet = server.create_pet(&token, "u1", "Rex").await?;
    let tasks = format!("/api/users/u1/pets/{}/scheduledTasks", pet);

    let task = data(server.post(&token, &tasks, json!({ "description": "walk" })).await?).await?;
    let path = format!("{}/{}", tasks, task["taskID"].as_str().unwrap_or_default());

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&token)
        .json(&json!({ "completedAt": "2025-04-30T08:00:00Z" }))
        .send()
        .await?;
    let updated = data(res).await?;
    assert_eq!(updated["status"], "PENDING");
    assert!(updated.get("completedAt").map_or(true, |v| v.is_null()), "{}", updated);

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&token)
        .json(&json!({ "status": "COMPLETED", "completedAt": "2025-04-30T08:00:00Z" }))
        .send()
        .await?;
    let done = data(res).await?;
    assert_eq!(done["status"], "COMPLETED");
    assert!(done["completedAt"].as_str().is_some_and(|at| at.starts_with("2025-04-30T08:00:00")));
    Ok(())
}
