use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::entities::{NewTask, NewUser, ProfileChanges, Task, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email is already registered")]
    DuplicateEmail,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::DuplicateEmail`] when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Returns `None` when the user no longer exists.
    async fn update_user(&self, id: i64, changes: ProfileChanges)
        -> Result<Option<User>, StoreError>;
}

#[async_trait::async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_tasks(&self, owner_id: i64) -> Result<Vec<Task>, StoreError>;

    async fn find_task(&self, id: i64) -> Result<Option<Task>, StoreError>;

    async fn create_task(&self, owner_id: i64, task: NewTask) -> Result<Task, StoreError>;

    /// Writes title, description and completion of `task`, scoped to its owner.
    async fn update_task(&self, task: &Task) -> Result<Option<Task>, StoreError>;

    async fn delete_task(&self, id: i64, owner_id: i64) -> Result<bool, StoreError>;
}

/// Opens the pool and brings the schema up to date.
pub async fn connect(database_url: &str) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    migrate(&pool).await?;

    Ok(pool)
}

/// A private in-memory database. Pinned to one connection since every
/// sqlite `:memory:` connection is its own database.
pub async fn connect_in_memory() -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    migrate(&pool).await?;

    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn unique_violation(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
        _ => StoreError::Sqlx(error),
    }
}

#[async_trait::async_trait]
impl UserStore for SqliteStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let now = Utc::now();

        sqlx::query_as(
            "INSERT INTO users (name, email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_violation)
    }

    async fn update_user(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as(
            "UPDATE users
             SET name = COALESCE(?, name),
                 password_hash = COALESCE(?, password_hash),
                 updated_at = ?
             WHERE id = ? RETURNING *",
        )
        .bind(changes.name)
        .bind(changes.password_hash)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait::async_trait]
impl TaskStore for SqliteStore {
    async fn list_tasks(&self, owner_id: i64) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as("SELECT * FROM tasks WHERE user_id = ? ORDER BY id")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    async fn find_task(&self, id: i64) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn create_task(&self, owner_id: i64, task: NewTask) -> Result<Task, StoreError> {
        let now = Utc::now();

        let task = sqlx::query_as(
            "INSERT INTO tasks (user_id, title, description, is_completed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(owner_id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.is_completed)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn update_task(&self, task: &Task) -> Result<Option<Task>, StoreError> {
        let updated = sqlx::query_as(
            "UPDATE tasks SET title = ?, description = ?, is_completed = ?, updated_at = ?
             WHERE id = ? AND user_id = ? RETURNING *",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.is_completed)
        .bind(Utc::now())
        .bind(task.id)
        .bind(task.user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete_task(&self, id: i64, owner_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
