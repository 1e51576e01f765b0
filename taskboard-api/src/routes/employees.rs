/// Employee endpoints
///
/// - `GET /v1/employees` - every employee
/// - `DELETE /v1/employees/:id` - remove an employee and their tasks (admin)
/// - `GET /v1/employees/by-status/:status` - employees with tasks in a status (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::{task::TaskStatus, user::User},
    services::{
        dashboard::{self, EmployeeWithTasks},
        identity::{self, DeleteEmployeeOutcome},
    },
};
use uuid::Uuid;

pub async fn list_employees(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(identity::list_employees(state.store()).await?))
}

/// Deletes an employee together with every task assigned to them
///
/// # Response
///
/// ```json
/// { "deleted_task_count": 3 }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an admin
/// - `404 Not Found`: no such user
/// - `422 Unprocessable Entity`: the user is an admin
pub async fn delete_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<Json<DeleteEmployeeOutcome>> {
    let outcome = identity::delete_employee(state.store(), &auth.email, employee_id).await?;
    Ok(Json(outcome))
}

/// Employees with at least one task in the given status
///
/// Non-admin callers get an empty list.
pub async fn by_task_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(status): Path<String>,
) -> ApiResult<Json<Vec<EmployeeWithTasks>>> {
    let status: TaskStatus = status.parse().map_err(ApiError::BadRequest)?;

    let employees = dashboard::get_employees_by_task_status(state.store(), &auth.email, status).await?;
    Ok(Json(employees))
}
