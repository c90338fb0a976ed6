//! Postgres backend built on `sqlx`.
//!
//! Queries are checked at runtime (`query_as`) so the crate builds without a live database.
//! The schema lives in `migrations/` and is applied by [`PgStore::migrate`].

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{StoreError, TaskStore, UniqueField, UserStore};
use crate::models::{NewUser, Task, TaskQuery, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";
const TASK_COLUMNS: &str =
    "id, title, description, state, priority, due_date, created_at, updated_at, user_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

/// Converts `sqlx::Error` into `StoreError`.
///
/// Unique violations are told apart by constraint name (`users_username_key`,
/// `users_email_key`); everything else becomes `StoreError::Database`.
impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_unique_violation() {
                let field = match db_error.constraint() {
                    Some(constraint) if constraint.contains("email") => UniqueField::Email,
                    _ => UniqueField::Username,
                };
                return StoreError::UniqueViolation(field);
            }
        }
        StoreError::Database(error.to_string())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $2 ORDER BY id LIMIT 1",
            USER_COLUMNS
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id OFFSET $1 LIMIT $2",
            USER_COLUMNS
        ))
        .bind(i64::from(skip))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET username = $1, email = $2, password_hash = $3 WHERE id = $4 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: i32) -> Result<bool, StoreError> {
        // tasks.user_id is ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: &Task) -> Result<Task, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, title, description, state, priority, due_date, created_at, updated_at, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.state)
        .bind(task.priority)
        .bind(task.due_date)
        .bind(task.created_at)
        .bind(task.updated_at)
        .bind(task.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn list_tasks(&self, owner: i32, query: &TaskQuery) -> Result<Vec<Task>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM tasks WHERE user_id = ", TASK_COLUMNS));
        builder.push_bind(owner);

        if let Some(title) = query.title.as_deref().filter(|t| !t.is_empty()) {
            builder.push(" AND title ILIKE ").push_bind(like_pattern(title));
        }
        if let Some(description) = query.description.as_deref().filter(|d| !d.is_empty()) {
            builder
                .push(" AND description ILIKE ")
                .push_bind(like_pattern(description));
        }
        if let Some(state) = query.state {
            builder.push(" AND state = ").push_bind(state);
        }
        if let Some(priority) = query.priority {
            builder.push(" AND priority = ").push_bind(priority);
        }
        if let Some(due_before) = query.due_before {
            builder.push(" AND due_date <= ").push_bind(due_before);
        }

        builder
            .push(" ORDER BY created_at, id OFFSET ")
            .push_bind(i64::from(query.offset))
            .push(" LIMIT ")
            .push_bind(i64::from(query.limit));

        let tasks = builder.build_query_as::<Task>().fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn find_task(&self, owner: i32, id: Uuid) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update_task(&self, owner: i32, task: &Task) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks \
             SET title = $1, description = $2, state = $3, priority = $4, due_date = $5, updated_at = $6 \
             WHERE id = $7 AND user_id = $8 \
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.state)
        .bind(task.priority)
        .bind(task.due_date)
        .bind(task.updated_at)
        .bind(task.id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn delete_task(&self, owner: i32, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// `%needle%` with LIKE metacharacters in `needle` escaped.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
