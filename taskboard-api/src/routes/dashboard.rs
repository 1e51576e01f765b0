/// Dashboard endpoints
///
/// - `GET /v1/dashboard/stats` - status counts over the caller's visible tasks
/// - `GET /v1/dashboard/employees` - per-employee counts (admin, otherwise empty)

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use taskboard_shared::{
    auth::middleware::AuthContext,
    services::dashboard::{self, EmployeeTaskSummary, TaskCounts},
};

pub async fn task_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TaskCounts>> {
    Ok(Json(dashboard::get_task_stats(state.store(), &auth.email).await?))
}

pub async fn employee_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<EmployeeTaskSummary>>> {
    Ok(Json(
        dashboard::get_employee_task_summary(state.store(), &auth.email).await?,
    ))
}
