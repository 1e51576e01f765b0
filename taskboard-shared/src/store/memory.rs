//! In-memory store.
//!
//! Used by the test suites and by `STORE_BACKEND=memory` for local runs.
//! Records are kept in insertion order so listings match the PostgreSQL
//! backend's `ORDER BY created_at`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreResult, TaskStore, UserStore};
use crate::models::task::{Task, TaskPatch, TaskStatus};
use crate::models::user::{CreateUser, User, UserRole};

/// A record plus its insertion sequence number.
#[derive(Debug, Clone)]
struct Entry<T> {
    seq: u64,
    record: T,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, Entry<User>>,

    /// Unique email index.
    users_by_email: HashMap<String, Uuid>,

    tasks: HashMap<Uuid, Entry<Task>>,

    next_seq: u64,
}

impl MemoryState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

fn ordered<T: Clone>(entries: impl Iterator<Item = Entry<T>>) -> Vec<T> {
    let mut entries: Vec<Entry<T>> = entries.collect();
    entries.sort_by_key(|e| e.seq);
    entries.into_iter().map(|e| e.record).collect()
}

/// Store backed by process memory. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn task_count(&self) -> usize {
        self.state.read().await.tasks.len()
    }

    async fn tasks_where(&self, pred: impl Fn(&Task) -> bool) -> Vec<Task> {
        let state = self.state.read().await;
        ordered(state.tasks.values().filter(|e| pred(&e.record)).cloned())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_or_insert_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if let Some(id) = state.users_by_email.get(&data.email) {
            if let Some(existing) = state.users.get(id) {
                return Ok(existing.record.clone());
            }
        }

        let user = data.into_user(Utc::now());
        let seq = state.next_seq();
        state.users_by_email.insert(user.email.clone(), user.id);
        state.users.insert(
            user.id,
            Entry {
                seq,
                record: user.clone(),
            },
        );

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).map(|e| e.record.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users_by_email
            .get(email)
            .and_then(|id| state.users.get(id))
            .map(|e| e.record.clone()))
    }

    async fn list_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(ordered(
            state
                .users
                .values()
                .filter(|e| e.record.role == role)
                .cloned(),
        ))
    }

    async fn delete_user_with_tasks(&self, id: Uuid) -> StoreResult<Option<u64>> {
        let mut state = self.state.write().await;

        let Some(removed) = state.users.remove(&id) else {
            return Ok(None);
        };
        state.users_by_email.remove(&removed.record.email);

        let before = state.tasks.len();
        state.tasks.retain(|_, e| e.record.assigned_to != id);
        let deleted = (before - state.tasks.len()) as u64;

        Ok(Some(deleted))
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: Task) -> StoreResult<Task> {
        let mut state = self.state.write().await;
        let seq = state.next_seq();
        state.tasks.insert(
            task.id,
            Entry {
                seq,
                record: task.clone(),
            },
        );
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.get(&id).map(|e| e.record.clone()))
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        Ok(self.tasks_where(|_| true).await)
    }

    async fn list_tasks_by_assignee(&self, user_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(self.tasks_where(|t| t.assigned_to == user_id).await)
    }

    async fn list_tasks_by_status(&self, status: TaskStatus) -> StoreResult<Vec<Task>> {
        Ok(self.tasks_where(|t| t.status == status).await)
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> StoreResult<Option<Task>> {
        let mut state = self.state.write().await;
        Ok(state.tasks.get_mut(&id).map(|e| {
            e.record.apply(patch);
            e.record.clone()
        }))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.tasks.remove(&id).is_some())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
