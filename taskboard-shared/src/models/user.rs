/// User model and database operations
///
/// Users are either administrators, who create and manage tasks, or employees,
/// who work the tasks assigned to them. A user's email is the identity key:
/// it is unique and is what every caller resolves through.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'employee');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     email TEXT NOT NULL UNIQUE,
///     name TEXT NOT NULL,
///     role user_role NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL
/// );
/// CREATE INDEX idx_users_role ON users(role);
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{User, CreateUser, UserRole};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create_if_absent(&pool, CreateUser::new(
///     "ada@example.com",
///     "Ada",
///     UserRole::Employee,
/// )).await?;
///
/// let found = User::find_by_email(&pool, "ada@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Role of a user. Assigned at creation and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Creates, edits, assigns and deletes tasks; manages employees
    Admin,

    /// Sees and updates the status of their own tasks
    Employee,
}

impl UserRole {
    /// Converts role to string for display and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Employee => "employee",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "employee" => Ok(UserRole::Employee),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// User account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, unique across all users
    pub email: String,

    /// Display name
    pub name: String,

    /// Admin or employee
    pub role: UserRole,

    /// When the user was first seen
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl CreateUser {
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            role,
        }
    }

    /// Builds the full record this input would produce at `now`
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: Uuid::new_v4(),
            email: self.email,
            name: self.name,
            role: self.role,
            created_at: now,
        }
    }
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Inserts a user unless one with the same email already exists
    ///
    /// The unique index on `email` arbitrates concurrent sign-ins: the losing
    /// insert becomes a no-op and the existing row is read back, so the same
    /// email always maps to the same user id. When the user already exists
    /// the supplied name and role are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn create_if_absent(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let candidate = data.into_user(Utc::now());

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, name, role, created_at
            "#,
        )
        .bind(candidate.id)
        .bind(&candidate.email)
        .bind(&candidate.name)
        .bind(candidate.role)
        .bind(candidate.created_at)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(user) => Ok(user),
            None => Self::find_by_email(pool, &candidate.email)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (exact match)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists all users with the given role, oldest first
    pub async fn list_by_role(pool: &PgPool, role: UserRole) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, role, created_at
            FROM users
            WHERE role = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(role)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Deletes a user together with every task assigned to them
    ///
    /// Both deletes run in one transaction, so readers never observe the
    /// user without their tasks or the tasks without their user.
    ///
    /// # Returns
    ///
    /// Number of tasks removed, or None if the user did not exist
    pub async fn delete_with_tasks(pool: &PgPool, id: Uuid) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let tasks = sqlx::query("DELETE FROM tasks WHERE assigned_to = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let users = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if users.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(tasks.rows_affected()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_as_str() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::Employee.as_str(), "employee");
    }

    #[test]
    fn test_user_role_from_str() {
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!("employee".parse::<UserRole>(), Ok(UserRole::Employee));
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_user_role_serde() {
        let json = serde_json::to_string(&UserRole::Employee).unwrap();
        assert_eq!(json, "\"employee\"");

        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert!(role.is_admin());
    }

    #[test]
    fn test_create_user_into_user() {
        let now = Utc::now();
        let user = CreateUser::new("e@example.com", "Eve", UserRole::Employee).into_user(now);

        assert_eq!(user.email, "e@example.com");
        assert_eq!(user.name, "Eve");
        assert_eq!(user.role, UserRole::Employee);
        assert_eq!(user.created_at, now);
        assert!(!user.is_admin());
    }
}
