/// Task endpoints
///
/// - `GET    /v1/tasks?status=&assigned_to=` - tasks visible to the caller
/// - `POST   /v1/tasks` - create a task (admin)
/// - `GET    /v1/tasks/:id` - one task (admin or assignee)
/// - `PATCH  /v1/tasks/:id` - edit title, description, priority or due date (admin)
/// - `DELETE /v1/tasks/:id` - delete a task (admin)
/// - `PUT    /v1/tasks/:id/status` - change status (admin or assignee)
/// - `PUT    /v1/tasks/:id/assignee` - reassign (admin)
///
/// Mutations respond with the task as stored after the change.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::task::{Task, TaskPriority, TaskStatus},
    services::tasks::{self, NewTaskInput, TaskEdit, TaskFilter},
    store::Store,
    ServiceError,
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub assigned_to: Uuid,

    pub priority: TaskPriority,

    pub due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<DateTime<Utc>>,
}

impl UpdateTaskRequest {
    fn normalize(&mut self) {
        if let Some(title) = self.title.as_mut() {
            *title = title.trim().to_string();
        }
    }

    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignTaskRequest {
    pub assigned_to: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTaskResponse {
    pub task_id: Uuid,
}

async fn stored(store: &dyn Store, task_id: Uuid) -> ApiResult<Json<Task>> {
    let task = tasks::get_task_by_id(store, task_id)
        .await?
        .ok_or_else(|| ServiceError::task_not_found(task_id))?;
    Ok(Json(task))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let filter = TaskFilter {
        status: query.status,
        assigned_to: query.assigned_to,
    };

    Ok(Json(
        tasks::list_tasks_filtered(state.store(), &auth.email, filter).await?,
    ))
}

/// Creates a pending task assigned by the caller
///
/// # Endpoint
///
/// ```text
/// POST /v1/tasks
/// Content-Type: application/json
///
/// {
///   "title": "Quarterly report",
///   "description": "Numbers for Q3",
///   "assigned_to": "uuid",
///   "priority": "high",
///   "due_date": "2025-10-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an admin
/// - `404 Not Found`: assignee does not exist
/// - `422 Unprocessable Entity`: validation failed
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(mut req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.normalize();
    req.validate()?;

    let task_id = tasks::create_task(
        state.store(),
        &auth.email,
        NewTaskInput {
            title: req.title,
            description: req.description,
            assigned_to: req.assigned_to,
            priority: req.priority,
            due_date: req.due_date,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, stored(state.store(), task_id).await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    Ok(Json(
        tasks::get_task_for_caller(state.store(), &auth.email, task_id).await?,
    ))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(mut req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.normalize();
    req.validate()?;
    if req.is_empty() {
        return Err(ApiError::ValidationError(vec![
            ValidationErrorDetail::new("body", "At least one field must be provided"),
        ]));
    }

    let edit = TaskEdit {
        title: req.title,
        description: req.description,
        priority: req.priority,
        due_date: req.due_date,
    };
    tasks::update_task(state.store(), &auth.email, task_id, edit).await?;

    stored(state.store(), task_id).await
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let task_id = tasks::delete_task(state.store(), &auth.email, task_id).await?;
    Ok(Json(DeleteTaskResponse { task_id }))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Task>> {
    tasks::update_task_status(state.store(), &auth.email, task_id, req.status).await?;
    stored(state.store(), task_id).await
}

pub async fn assign_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<AssignTaskRequest>,
) -> ApiResult<Json<Task>> {
    tasks::assign_task(state.store(), &auth.email, task_id, req.assigned_to).await?;
    stored(state.store(), task_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let req: CreateTaskRequest = serde_json::from_value(serde_json::json!({
            "title": "",
            "assigned_to": Uuid::nil(),
            "priority": "low"
        }))
        .unwrap();

        assert!(req.description.is_empty());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_blank_titles_rejected_after_trim() {
        let mut req: CreateTaskRequest = serde_json::from_value(serde_json::json!({
            "title": "   ",
            "assigned_to": Uuid::nil(),
            "priority": "low"
        }))
        .unwrap();
        req.normalize();
        assert!(req.validate().is_err());

        let mut req: UpdateTaskRequest =
            serde_json::from_value(serde_json::json!({ "title": "  Padded  " })).unwrap();
        req.normalize();
        assert_eq!(req.title.as_deref(), Some("Padded"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_is_empty() {
        assert!(UpdateTaskRequest::default().is_empty());

        let req: UpdateTaskRequest =
            serde_json::from_value(serde_json::json!({ "priority": "high" })).unwrap();
        assert!(!req.is_empty());
        assert!(req.validate().is_ok());
    }
}
