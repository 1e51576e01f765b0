/// Task lifecycle operations
///
/// Admins create, edit, reassign and delete tasks. The assignee of a task may
/// change its status and nothing else. Every mutation resolves the caller,
/// consults the policy and only then writes, so a failed call leaves the
/// store untouched.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{TaskPriority, TaskStatus};
/// use taskboard_shared::services::tasks::{create_task, update_task_status, NewTaskInput};
/// use taskboard_shared::store::MemoryStore;
/// use uuid::Uuid;
///
/// # async fn example(employee_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
///
/// let task_id = create_task(&store, "boss@example.com", NewTaskInput {
///     title: "Quarterly report".to_string(),
///     description: String::new(),
///     assigned_to: employee_id,
///     priority: TaskPriority::High,
///     due_date: None,
/// }).await?;
///
/// update_task_status(&store, "emp@example.com", task_id, TaskStatus::Completed).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{guard, require, resolve_caller};
use crate::auth::authorization::{task_scope, Action, TaskScope};
use crate::error::{ServiceError, ServiceResult};
use crate::models::task::{CreateTask, Task, TaskPatch, TaskPriority, TaskStatus};
use crate::store::Store;

/// Fields an admin supplies when creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTaskInput {
    pub title: String,
    pub description: String,
    pub assigned_to: Uuid,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial edit of a task's descriptive fields
///
/// Assignee and status have their own operations and cannot be changed here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskEdit {
    fn into_patch(self, now: DateTime<Utc>) -> TaskPatch {
        TaskPatch {
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            ..TaskPatch::touch(now)
        }
    }
}

/// Narrows a caller's task listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
}

async fn find_existing(store: &dyn Store, task_id: Uuid) -> ServiceResult<Task> {
    store
        .find_task(task_id)
        .await?
        .ok_or_else(|| ServiceError::task_not_found(task_id))
}

async fn ensure_user_exists(store: &dyn Store, user_id: Uuid) -> ServiceResult<()> {
    match store.find_user_by_id(user_id).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::user_not_found(user_id)),
    }
}

async fn apply_patch(store: &dyn Store, task_id: Uuid, patch: TaskPatch) -> ServiceResult<Task> {
    store
        .update_task(task_id, patch)
        .await?
        .ok_or_else(|| ServiceError::task_not_found(task_id))
}

/// Creates a pending task assigned by the caller
///
/// Returns the new task's id.
pub async fn create_task(
    store: &dyn Store,
    caller_email: &str,
    input: NewTaskInput,
) -> ServiceResult<Uuid> {
    let admin = require(store, caller_email, Action::CreateTask).await?;
    ensure_user_exists(store, input.assigned_to).await?;

    let task = CreateTask {
        title: input.title,
        description: input.description,
        assigned_to: input.assigned_to,
        assigned_by: admin.id,
        priority: input.priority,
        due_date: input.due_date,
    }
    .into_task(Utc::now());

    let task = store.insert_task(task).await?;

    info!(
        task_id = %task.id,
        assigned_to = %task.assigned_to,
        assigned_by = %task.assigned_by,
        priority = %task.priority,
        "Task created"
    );
    Ok(task.id)
}

/// Moves a task to any status
///
/// Allowed for admins and for the task's current assignee. Completing a task
/// stamps `completed_at`; any other status clears it.
pub async fn update_task_status(
    store: &dyn Store,
    caller_email: &str,
    task_id: Uuid,
    status: TaskStatus,
) -> ServiceResult<Uuid> {
    let caller = resolve_caller(store, caller_email).await?;
    if caller.is_none() {
        guard(None, caller_email, Action::UpdateTaskStatus, None)?;
    }

    let task = find_existing(store, task_id).await?;
    guard(caller.as_ref(), caller_email, Action::UpdateTaskStatus, Some(&task))?;

    let from = task.status;
    apply_patch(store, task_id, TaskPatch::status(status, Utc::now())).await?;

    info!(task_id = %task_id, %from, to = %status, "Task status updated");
    Ok(task_id)
}

/// Reassigns a task; status is left as it is
pub async fn assign_task(
    store: &dyn Store,
    caller_email: &str,
    task_id: Uuid,
    assignee_id: Uuid,
) -> ServiceResult<Uuid> {
    require(store, caller_email, Action::AssignTask).await?;
    find_existing(store, task_id).await?;
    ensure_user_exists(store, assignee_id).await?;

    apply_patch(store, task_id, TaskPatch::assignee(assignee_id, Utc::now())).await?;

    info!(task_id = %task_id, assigned_to = %assignee_id, "Task reassigned");
    Ok(task_id)
}

/// Edits a task's title, description, priority or due date
pub async fn update_task(
    store: &dyn Store,
    caller_email: &str,
    task_id: Uuid,
    edit: TaskEdit,
) -> ServiceResult<Uuid> {
    require(store, caller_email, Action::EditTask).await?;

    apply_patch(store, task_id, edit.into_patch(Utc::now())).await?;

    info!(task_id = %task_id, "Task updated");
    Ok(task_id)
}

pub async fn delete_task(store: &dyn Store, caller_email: &str, task_id: Uuid) -> ServiceResult<Uuid> {
    require(store, caller_email, Action::DeleteTask).await?;

    if !store.delete_task(task_id).await? {
        return Err(ServiceError::task_not_found(task_id));
    }

    info!(task_id = %task_id, "Task deleted");
    Ok(task_id)
}

/// Tasks visible to the caller
///
/// Admins get every task, employees get their own and an unknown caller gets
/// an empty list.
pub async fn list_tasks_for_caller(store: &dyn Store, caller_email: &str) -> ServiceResult<Vec<Task>> {
    list_tasks_filtered(store, caller_email, TaskFilter::default()).await
}

/// Tasks visible to the caller, narrowed by status and/or assignee
pub async fn list_tasks_filtered(
    store: &dyn Store,
    caller_email: &str,
    filter: TaskFilter,
) -> ServiceResult<Vec<Task>> {
    let caller = resolve_caller(store, caller_email).await?;

    let tasks = match (task_scope(caller.as_ref()), filter.assigned_to) {
        (TaskScope::Nothing, _) => return Ok(Vec::new()),
        (TaskScope::AssignedTo(own), Some(other)) if own != other => return Ok(Vec::new()),
        (TaskScope::AssignedTo(user_id), _) | (TaskScope::All, Some(user_id)) => {
            store.list_tasks_by_assignee(user_id).await?
        }
        (TaskScope::All, None) => match filter.status {
            Some(status) => return Ok(store.list_tasks_by_status(status).await?),
            None => store.list_tasks().await?,
        },
    };

    Ok(match filter.status {
        Some(status) => tasks.into_iter().filter(|t| t.status == status).collect(),
        None => tasks,
    })
}

/// Unguarded lookup by id
pub async fn get_task_by_id(store: &dyn Store, task_id: Uuid) -> ServiceResult<Option<Task>> {
    Ok(store.find_task(task_id).await?)
}

/// Lookup by id restricted to admins and the task's assignee
pub async fn get_task_for_caller(
    store: &dyn Store,
    caller_email: &str,
    task_id: Uuid,
) -> ServiceResult<Task> {
    let caller = resolve_caller(store, caller_email).await?;
    if caller.is_none() {
        guard(None, caller_email, Action::ViewTask, None)?;
    }

    let task = find_existing(store, task_id).await?;
    guard(caller.as_ref(), caller_email, Action::ViewTask, Some(&task))?;

    Ok(task)
}
