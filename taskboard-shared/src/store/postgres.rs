/// PostgreSQL store
///
/// Thin adapter from the store traits to the model queries in
/// [`crate::models`]. Holds a `PgPool`, which is itself cheap to clone.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreResult, TaskStore, UserStore};
use crate::db::pool::health_check;
use crate::models::task::{Task, TaskPatch, TaskStatus};
use crate::models::user::{CreateUser, User, UserRole};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_or_insert_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create_if_absent(&self.pool, data).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn list_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>> {
        Ok(User::list_by_role(&self.pool, role).await?)
    }

    async fn delete_user_with_tasks(&self, id: Uuid) -> StoreResult<Option<u64>> {
        Ok(User::delete_with_tasks(&self.pool, id).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: Task) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, task).await?)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        Ok(Task::list_all(&self.pool).await?)
    }

    async fn list_tasks_by_assignee(&self, user_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_assignee(&self.pool, user_id).await?)
    }

    async fn list_tasks_by_status(&self, status: TaskStatus) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_status(&self.pool, status).await?)
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, id, patch).await?)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
