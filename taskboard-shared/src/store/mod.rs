/// Storage backends
///
/// The service layer talks to storage through the [`UserStore`] and
/// [`TaskStore`] traits so the same operations run against PostgreSQL in
/// production and against memory in tests and local development.
///
/// # Backends
///
/// - [`postgres::PgStore`]: sqlx over a `PgPool`, one query per call
/// - [`memory::MemoryStore`]: `HashMap`s behind a tokio `RwLock`
///
/// Every method is a single atomic read or write, except
/// [`UserStore::delete_user_with_tasks`], which both backends run as one
/// atomic unit.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::task::{Task, TaskPatch, TaskStatus};
use crate::models::user::{CreateUser, User, UserRole};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// User records, indexed by id, email and role
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns the user with this email, inserting `data` first if there is none
    async fn find_or_insert_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn list_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>>;

    /// Deletes a user and every task assigned to them, atomically
    ///
    /// Returns the number of tasks removed, or None if the user didn't exist.
    async fn delete_user_with_tasks(&self, id: Uuid) -> StoreResult<Option<u64>>;
}

/// Task records, indexed by id, assignee and status
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: Task) -> StoreResult<Task>;

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// All tasks, oldest first
    async fn list_tasks(&self) -> StoreResult<Vec<Task>>;

    async fn list_tasks_by_assignee(&self, user_id: Uuid) -> StoreResult<Vec<Task>>;

    async fn list_tasks_by_status(&self, status: TaskStatus) -> StoreResult<Vec<Task>>;

    /// Applies a patch, returning the updated task or None if it doesn't exist
    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> StoreResult<Option<Task>>;

    /// Returns true if a task was removed
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;

    /// Liveness probe for health checks
    async fn ping(&self) -> StoreResult<()>;
}

/// A complete backend
pub trait Store: UserStore + TaskStore {}

impl<T: UserStore + TaskStore> Store for T {}
