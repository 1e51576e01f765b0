/// Task model and database operations
///
/// A task is a unit of work an admin hands to a user. It records who it is
/// assigned to, which admin assigned it, and where it stands.
///
/// # Status
///
/// ```text
/// pending ⇄ in_progress ⇄ completed
///    ↖__________________________↙
/// ```
///
/// Any status may move to any other status. `completed_at` is stamped when a
/// task becomes completed and cleared when it leaves completed.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'completed');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY,
///     title TEXT NOT NULL,
///     description TEXT NOT NULL,
///     assigned_to UUID NOT NULL,
///     assigned_by UUID NOT NULL,
///     status task_status NOT NULL DEFAULT 'pending',
///     priority task_priority NOT NULL,
///     due_date TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL,
///     completed_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{Task, CreateTask, TaskPriority};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     title: "Restock shelves".to_string(),
///     description: "Aisle 4".to_string(),
///     assigned_to: Uuid::new_v4(),
///     assigned_by: Uuid::new_v4(),
///     priority: TaskPriority::High,
///     due_date: None,
/// }.into_task(Utc::now())).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Task progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet
    Pending,

    /// Being worked on
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Converts status to string for display and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

/// Task urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short summary
    pub title: String,

    /// Free-form details
    pub description: String,

    /// User the task is delegated to
    pub assigned_to: Uuid,

    /// Admin who created the task
    pub assigned_by: Uuid,

    /// Current status
    pub status: TaskStatus,

    /// Urgency
    pub priority: TaskPriority,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last modified
    pub updated_at: DateTime<Utc>,

    /// When the task was completed (set only while status is completed)
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for creating a new task
///
/// There is no status field: new tasks always start out pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub assigned_to: Uuid,
    pub assigned_by: Uuid,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
}

impl CreateTask {
    /// Builds the pending task record this input would produce at `now`
    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            assigned_to: self.assigned_to,
            assigned_by: self.assigned_by,
            status: TaskStatus::Pending,
            priority: self.priority,
            due_date: self.due_date,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}

/// Partial update of a task
///
/// Only `Some` fields are written; `updated_at` is always written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub status: Option<TaskStatus>,

    /// New completion timestamp (use Some(None) to clear)
    pub completed_at: Option<Option<DateTime<Utc>>>,

    pub updated_at: DateTime<Utc>,
}

impl TaskPatch {
    /// An empty patch that only bumps `updated_at`
    pub fn touch(now: DateTime<Utc>) -> Self {
        Self {
            title: None,
            description: None,
            priority: None,
            due_date: None,
            assigned_to: None,
            status: None,
            completed_at: None,
            updated_at: now,
        }
    }

    /// Status change, stamping or clearing `completed_at` to match
    pub fn status(status: TaskStatus, now: DateTime<Utc>) -> Self {
        let completed_at = if status.is_completed() { Some(now) } else { None };
        Self {
            status: Some(status),
            completed_at: Some(completed_at),
            ..Self::touch(now)
        }
    }

    /// Reassignment to another user
    pub fn assignee(assigned_to: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            assigned_to: Some(assigned_to),
            ..Self::touch(now)
        }
    }
}

impl Task {
    /// Applies a patch in place
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = completed_at;
        }
        self.updated_at = patch.updated_at;
    }

    /// Inserts a fully-formed task record
    pub async fn create(pool: &PgPool, task: Task) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, title, description, assigned_to, assigned_by, status,
                               priority, due_date, created_at, updated_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, title, description, assigned_to, assigned_by, status, priority,
                      due_date, created_at, updated_at, completed_at
            "#,
        )
        .bind(task.id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.assigned_to)
        .bind(task.assigned_by)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.due_date)
        .bind(task.created_at)
        .bind(task.updated_at)
        .bind(task.completed_at)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, assigned_to, assigned_by, status, priority,
                   due_date, created_at, updated_at, completed_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists every task, oldest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, assigned_to, assigned_by, status, priority,
                   due_date, created_at, updated_at, completed_at
            FROM tasks
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks assigned to a user (uses `idx_tasks_assigned_to`)
    pub async fn list_by_assignee(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, assigned_to, assigned_by, status, priority,
                   due_date, created_at, updated_at, completed_at
            FROM tasks
            WHERE assigned_to = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks in a status (uses `idx_tasks_status`)
    pub async fn list_by_status(pool: &PgPool, status: TaskStatus) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, assigned_to, assigned_by, status, priority,
                   due_date, created_at, updated_at, completed_at
            FROM tasks
            WHERE status = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a partial update
    ///
    /// # Returns
    ///
    /// The updated task, or None if it doesn't exist
    pub async fn update(pool: &PgPool, id: Uuid, patch: TaskPatch) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = $2");
        let mut bind_count = 2;

        if patch.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if patch.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if patch.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if patch.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if patch.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }
        if patch.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if patch.completed_at.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed_at = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, assigned_to, assigned_by, status, \
             priority, due_date, created_at, updated_at, completed_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(patch.updated_at);

        if let Some(title) = patch.title {
            q = q.bind(title);
        }
        if let Some(description) = patch.description {
            q = q.bind(description);
        }
        if let Some(priority) = patch.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = patch.due_date {
            q = q.bind(due_date);
        }
        if let Some(assigned_to) = patch.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(status) = patch.status {
            q = q.bind(status);
        }
        if let Some(completed_at) = patch.completed_at {
            q = q.bind(completed_at);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
