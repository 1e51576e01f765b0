/// Dashboard aggregations
///
/// Counts are derived by scanning the caller's visible tasks. Nothing here
/// writes, and none of it fails on identity: an unknown caller or a
/// non-admin asking for team views gets zeros or an empty list.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use super::resolve_caller;
use crate::auth::authorization::{authorize, task_scope, Action, TaskScope};
use crate::error::ServiceResult;
use crate::models::task::{Task, TaskStatus};
use crate::models::user::{User, UserRole};
use crate::store::Store;

/// Task counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub total: u64,
}

impl TaskCounts {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Completed => counts.completed += 1,
            }
        }
        counts.total = counts.pending + counts.in_progress + counts.completed;
        counts
    }
}

/// One employee's workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeTaskSummary {
    pub employee: User,
    pub total_tasks: u64,
    pub pending_tasks: u64,
    pub in_progress_tasks: u64,
    pub completed_tasks: u64,
}

impl EmployeeTaskSummary {
    fn new(employee: User, tasks: &[Task]) -> Self {
        let counts = TaskCounts::from_tasks(tasks);
        Self {
            employee,
            total_tasks: counts.total,
            pending_tasks: counts.pending,
            in_progress_tasks: counts.in_progress,
            completed_tasks: counts.completed,
        }
    }
}

/// An employee together with their tasks in one status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeWithTasks {
    #[serde(flatten)]
    pub employee: User,
    pub tasks: Vec<Task>,
}

/// Status counts over the tasks the caller can see
pub async fn get_task_stats(store: &dyn Store, caller_email: &str) -> ServiceResult<TaskCounts> {
    let caller = resolve_caller(store, caller_email).await?;

    let tasks = match task_scope(caller.as_ref()) {
        TaskScope::Nothing => return Ok(TaskCounts::default()),
        TaskScope::All => store.list_tasks().await?,
        TaskScope::AssignedTo(user_id) => store.list_tasks_by_assignee(user_id).await?,
    };

    Ok(TaskCounts::from_tasks(&tasks))
}

async fn is_team_viewer(store: &dyn Store, caller_email: &str) -> ServiceResult<bool> {
    let caller = resolve_caller(store, caller_email).await?;
    Ok(authorize(caller.as_ref(), Action::ViewTeam, None).is_allowed())
}

/// Per-employee counts for every employee (admins only, otherwise empty)
///
/// Each employee's tasks are fetched with their own assignee query; the
/// queries run concurrently.
pub async fn get_employee_task_summary(
    store: &dyn Store,
    caller_email: &str,
) -> ServiceResult<Vec<EmployeeTaskSummary>> {
    if !is_team_viewer(store, caller_email).await? {
        return Ok(Vec::new());
    }

    let employees = store.list_users_by_role(UserRole::Employee).await?;

    try_join_all(employees.into_iter().map(|employee| async move {
        let tasks = store.list_tasks_by_assignee(employee.id).await?;
        ServiceResult::Ok(EmployeeTaskSummary::new(employee, &tasks))
    }))
    .await
}

/// Employees with at least one task in `status`, each with those tasks
/// (admins only, otherwise empty)
pub async fn get_employees_by_task_status(
    store: &dyn Store,
    caller_email: &str,
    status: TaskStatus,
) -> ServiceResult<Vec<EmployeeWithTasks>> {
    if !is_team_viewer(store, caller_email).await? {
        return Ok(Vec::new());
    }

    let employees = store.list_users_by_role(UserRole::Employee).await?;

    let grouped = try_join_all(employees.into_iter().map(|employee| async move {
        let tasks: Vec<Task> = store
            .list_tasks_by_assignee(employee.id)
            .await?
            .into_iter()
            .filter(|t| t.status == status)
            .collect();
        ServiceResult::Ok(EmployeeWithTasks { employee, tasks })
    }))
    .await?;

    Ok(grouped.into_iter().filter(|e| !e.tasks.is_empty()).collect())
}
