/// Integration tests for the Taskboard API
///
/// Drive the full router (auth layer, handlers, error mapping) against the
/// in-memory store:
/// - sign-in and token handling
/// - task lifecycle and permissions
/// - employee removal
/// - dashboard aggregates

mod common;

use axum::http::StatusCode;
use common::{sign_in, TestContext};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "connected");
}

#[tokio::test]
async fn test_sign_in_is_idempotent() {
    let ctx = TestContext::new().await;

    let again = sign_in(&ctx.app, "admin@example.com", "Someone Else", "employee").await;
    assert_eq!(again.user_id, ctx.admin.user_id);

    let (status, me) = ctx.send("GET", "/v1/users/me", Some(&again), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Ada Admin");
    assert_eq!(me["role"], "admin");
    assert_eq!(ctx.store.user_count().await, 2);
}

#[tokio::test]
async fn test_sign_in_validation() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/auth/sign-in",
            None,
            Some(json!({ "email": "not-an-email", "name": "X", "role": "employee" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_sign_in_normalizes_email() {
    let ctx = TestContext::new().await;

    let again = sign_in(&ctx.app, "  Admin@Example.com ", "Ada Admin", "admin").await;
    assert_eq!(again.user_id, ctx.admin.user_id);
    assert_eq!(ctx.store.user_count().await, 2);
}

#[tokio::test]
async fn test_sign_in_rejects_blank_name() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/auth/sign-in",
            None,
            Some(json!({ "email": "new@example.com", "name": "   ", "role": "employee" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "name");
    assert_eq!(ctx.store.user_count().await, 2);
}

#[tokio::test]
async fn test_blank_task_titles_rejected() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/tasks",
            Some(&ctx.admin),
            Some(json!({
                "title": "   ",
                "assigned_to": ctx.employee.user_id,
                "priority": "low"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "title");
    assert_eq!(ctx.store.task_count().await, 0);

    let task_id = ctx.create_task("Keep me", ctx.employee.user_id).await;
    let (status, _) = ctx
        .send(
            "PATCH",
            &format!("/v1/tasks/{}", task_id),
            Some(&ctx.admin),
            Some(json!({ "title": " \t " })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, task) = ctx
        .send(
            "PATCH",
            &format!("/v1/tasks/{}", task_id),
            Some(&ctx.admin),
            Some(json!({ "title": "  Trimmed title  " })),
        )
        .await;
    assert_eq!(task["title"], "Trimmed title");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx.send("GET", "/v1/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = common::send(
        &ctx.app,
        "GET",
        "/v1/tasks",
        Some("Bearer garbage".to_string()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = common::send(
        &ctx.app,
        "GET",
        "/v1/tasks",
        Some(format!("Bearer {}", ctx.admin.refresh_token)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_issues_working_access_token() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": ctx.employee.refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["access_token"].as_str().unwrap().to_string();
    let (status, me) = common::send(
        &ctx.app,
        "GET",
        "/v1/users/me",
        Some(format!("Bearer {}", token)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "emp@example.com");
}

#[tokio::test]
async fn test_task_lifecycle() {
    let ctx = TestContext::new().await;
    let task_id = ctx.create_task("Write report", ctx.employee.user_id).await;

    let (status, task) = ctx
        .send("GET", &format!("/v1/tasks/{}", task_id), Some(&ctx.employee), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "pending");
    assert_eq!(task["assigned_by"], ctx.admin.user_id.to_string());
    assert!(task["completed_at"].is_null());

    let (status, task) = ctx
        .send(
            "PUT",
            &format!("/v1/tasks/{}/status", task_id),
            Some(&ctx.employee),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "completed");
    assert!(task["completed_at"].is_string());

    let (status, stats) = ctx
        .send("GET", "/v1/dashboard/stats", Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats, json!({ "pending": 0, "in_progress": 0, "completed": 1, "total": 1 }));

    let (status, task) = ctx
        .send(
            "PATCH",
            &format!("/v1/tasks/{}", task_id),
            Some(&ctx.admin),
            Some(json!({ "title": "Write final report", "priority": "high" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["title"], "Write final report");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["status"], "completed");

    let (status, body) = ctx
        .send("DELETE", &format!("/v1/tasks/{}", task_id), Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task_id"], task_id.to_string());

    let (status, _) = ctx
        .send("GET", &format!("/v1/tasks/{}", task_id), Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_employee_cannot_manage_tasks() {
    let ctx = TestContext::new().await;
    let task_id = ctx.create_task("Admin's call", ctx.employee.user_id).await;

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/tasks",
            Some(&ctx.employee),
            Some(json!({
                "title": "Self-assigned",
                "assigned_to": ctx.employee.user_id,
                "priority": "low"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = ctx
        .send(
            "PATCH",
            &format!("/v1/tasks/{}", task_id),
            Some(&ctx.employee),
            Some(json!({ "title": "Renamed" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send("DELETE", &format!("/v1/tasks/{}", task_id), Some(&ctx.employee), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(
            "PUT",
            &format!("/v1/tasks/{}/assignee", task_id),
            Some(&ctx.employee),
            Some(json!({ "assigned_to": ctx.admin.user_id })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_non_assignee_cannot_update_status_or_view() {
    let ctx = TestContext::new().await;
    let other = sign_in(&ctx.app, "other@example.com", "Olive", "employee").await;
    let task_id = ctx.create_task("Not yours", ctx.employee.user_id).await;

    let (status, _) = ctx
        .send(
            "PUT",
            &format!("/v1/tasks/{}/status", task_id),
            Some(&other),
            Some(json!({ "status": "in_progress" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send("GET", &format!("/v1/tasks/{}", task_id), Some(&other), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, task) = ctx
        .send("GET", &format!("/v1/tasks/{}", task_id), Some(&ctx.admin), None)
        .await;
    assert_eq!(task["status"], "pending");
}

#[tokio::test]
async fn test_reassignment_moves_visibility() {
    let ctx = TestContext::new().await;
    let other = sign_in(&ctx.app, "other@example.com", "Olive", "employee").await;
    let task_id = ctx.create_task("Hand over", ctx.employee.user_id).await;

    let (status, task) = ctx
        .send(
            "PUT",
            &format!("/v1/tasks/{}/assignee", task_id),
            Some(&ctx.admin),
            Some(json!({ "assigned_to": other.user_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["assigned_to"], other.user_id.to_string());

    let (_, mine) = ctx.send("GET", "/v1/tasks", Some(&ctx.employee), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 0);

    let (_, theirs) = ctx.send("GET", "/v1/tasks", Some(&other), None).await;
    assert_eq!(theirs.as_array().unwrap().len(), 1);

    let (status, _) = ctx
        .send(
            "PUT",
            &format!("/v1/tasks/{}/assignee", task_id),
            Some(&ctx.admin),
            Some(json!({ "assigned_to": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_tasks_filters() {
    let ctx = TestContext::new().await;
    let first = ctx.create_task("First", ctx.employee.user_id).await;
    ctx.create_task("Second", ctx.employee.user_id).await;
    ctx.create_task("Admin's own", ctx.admin.user_id).await;

    ctx.send(
        "PUT",
        &format!("/v1/tasks/{}/status", first),
        Some(&ctx.employee),
        Some(json!({ "status": "in_progress" })),
    )
    .await;

    let (_, all) = ctx.send("GET", "/v1/tasks", Some(&ctx.admin), None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, in_progress) = ctx
        .send("GET", "/v1/tasks?status=in_progress", Some(&ctx.admin), None)
        .await;
    assert_eq!(in_progress.as_array().unwrap().len(), 1);
    assert_eq!(in_progress[0]["id"], first.to_string());

    let (_, by_assignee) = ctx
        .send(
            "GET",
            &format!("/v1/tasks?assigned_to={}", ctx.employee.user_id),
            Some(&ctx.admin),
            None,
        )
        .await;
    assert_eq!(by_assignee.as_array().unwrap().len(), 2);

    let (_, own_pending) = ctx
        .send("GET", "/v1/tasks?status=pending", Some(&ctx.employee), None)
        .await;
    assert_eq!(own_pending.as_array().unwrap().len(), 1);
    assert_eq!(own_pending[0]["title"], "Second");
}

#[tokio::test]
async fn test_delete_employee_cascades() {
    let ctx = TestContext::new().await;
    for title in ["one", "two", "three"] {
        ctx.create_task(title, ctx.employee.user_id).await;
    }

    let uri = format!("/v1/employees/{}", ctx.employee.user_id);

    let (status, _) = ctx.send("DELETE", &uri, Some(&ctx.employee), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx.send("DELETE", &uri, Some(&ctx.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_task_count"], 3);
    assert_eq!(ctx.store.task_count().await, 0);

    // The deleted employee's token no longer resolves
    let (_, tasks) = ctx.send("GET", "/v1/tasks", Some(&ctx.employee), None).await;
    assert_eq!(tasks, json!([]));
    let (status, _) = ctx.send("GET", "/v1/users/me", Some(&ctx.employee), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx.send("DELETE", &uri, Some(&ctx.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx
        .send(
            "DELETE",
            &format!("/v1/employees/{}", ctx.admin.user_id),
            Some(&ctx.admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_dashboard_team_views_are_admin_only() {
    let ctx = TestContext::new().await;
    let task_id = ctx.create_task("Done soon", ctx.employee.user_id).await;
    ctx.create_task("Later", ctx.employee.user_id).await;

    ctx.send(
        "PUT",
        &format!("/v1/tasks/{}/status", task_id),
        Some(&ctx.employee),
        Some(json!({ "status": "completed" })),
    )
    .await;

    let (status, summary) = ctx
        .send("GET", "/v1/dashboard/employees", Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary[0]["employee"]["email"], "emp@example.com");
    assert_eq!(summary[0]["total_tasks"], 2);
    assert_eq!(summary[0]["completed_tasks"], 1);

    let (_, summary) = ctx
        .send("GET", "/v1/dashboard/employees", Some(&ctx.employee), None)
        .await;
    assert_eq!(summary, json!([]));

    let (status, grouped) = ctx
        .send("GET", "/v1/employees/by-status/completed", Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grouped[0]["email"], "emp@example.com");
    assert_eq!(grouped[0]["tasks"].as_array().unwrap().len(), 1);

    let (status, _) = ctx
        .send("GET", "/v1/employees/by-status/archived", Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, own) = ctx
        .send("GET", "/v1/dashboard/stats", Some(&ctx.employee), None)
        .await;
    assert_eq!(own["total"], 2);
}

#[tokio::test]
async fn test_user_lookups() {
    let ctx = TestContext::new().await;

    let (status, user) = ctx
        .send("GET", "/v1/users/lookup?email=emp@example.com", Some(&ctx.admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["id"], ctx.employee.user_id.to_string());

    let (status, user) = ctx
        .send(
            "GET",
            &format!("/v1/users/{}", ctx.admin.user_id),
            Some(&ctx.employee),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["role"], "admin");

    let (status, _) = ctx
        .send(
            "GET",
            &format!("/v1/users/{}", Uuid::new_v4()),
            Some(&ctx.admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, employees) = ctx.send("GET", "/v1/employees", Some(&ctx.admin), None).await;
    assert_eq!(employees.as_array().unwrap().len(), 1);
}
