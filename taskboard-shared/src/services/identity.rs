/// Identity operations
///
/// Users are created on first sign-in and found by email afterwards. The only
/// way a user is removed is [`delete_employee`], which takes the employee's
/// tasks with them.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::require;
use crate::auth::authorization::Action;
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::{CreateUser, User, UserRole};
use crate::store::Store;

/// Result of removing an employee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteEmployeeOutcome {
    /// Tasks that were assigned to the employee and removed with them
    pub deleted_task_count: u64,
}

/// Returns the id of the user with `email`, creating the user if needed
///
/// A returning user keeps their stored name and role; the supplied ones only
/// apply on first sign-in.
pub async fn get_or_create_user(
    store: &dyn Store,
    email: &str,
    name: &str,
    role: UserRole,
) -> ServiceResult<Uuid> {
    let user = store
        .find_or_insert_user(CreateUser::new(email, name, role))
        .await?;

    info!(user_id = %user.id, email = %user.email, role = %user.role, "User signed in");
    Ok(user.id)
}

pub async fn get_user_by_email(store: &dyn Store, email: &str) -> ServiceResult<Option<User>> {
    Ok(store.find_user_by_email(email).await?)
}

pub async fn get_user_profile(store: &dyn Store, user_id: Uuid) -> ServiceResult<Option<User>> {
    Ok(store.find_user_by_id(user_id).await?)
}

/// All users with the employee role, oldest first
pub async fn list_employees(store: &dyn Store) -> ServiceResult<Vec<User>> {
    Ok(store.list_users_by_role(UserRole::Employee).await?)
}

/// Removes an employee and every task assigned to them
///
/// # Errors
///
/// - `Authentication` if the caller doesn't resolve
/// - `Authorization` if the caller isn't an admin
/// - `NotFound` if there is no such user
/// - `Validation` if the user is an admin
pub async fn delete_employee(
    store: &dyn Store,
    caller_email: &str,
    employee_id: Uuid,
) -> ServiceResult<DeleteEmployeeOutcome> {
    let caller = require(store, caller_email, Action::DeleteEmployee).await?;

    let target = store
        .find_user_by_id(employee_id)
        .await?
        .ok_or_else(|| ServiceError::user_not_found(employee_id))?;

    if target.role != UserRole::Employee {
        return Err(ServiceError::Validation(format!(
            "user {} is not an employee",
            employee_id
        )));
    }

    // Gone between the lookup and the delete: report it like any missing user
    let deleted_task_count = store
        .delete_user_with_tasks(employee_id)
        .await?
        .ok_or_else(|| ServiceError::user_not_found(employee_id))?;

    info!(
        admin_id = %caller.id,
        employee_id = %employee_id,
        deleted_task_count,
        "Employee deleted"
    );

    Ok(DeleteEmployeeOutcome { deleted_task_count })
}
