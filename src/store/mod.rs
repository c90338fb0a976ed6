//! Persistence seam.
//!
//! Handlers and the principal resolver only talk to the traits defined here. Two backends
//! implement them: [`postgres::PgStore`] for real deployments and [`memory::MemoryStore`]
//! for tests and database-less local runs.
//!
//! Every task operation takes the owner's id. There is no way to reach a task without
//! naming its owner, so a task belonging to someone else is simply not found.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use crate::models::{NewUser, Task, TaskQuery, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Which unique column a write collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

/// Uniform error type for all storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An insert or update would duplicate a username or an email.
    UniqueViolation(UniqueField),
    /// Anything else the backend reports.
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::UniqueViolation(UniqueField::Username) => write!(f, "username already taken"),
            StoreError::UniqueViolation(UniqueField::Email) => write!(f, "email already taken"),
            StoreError::Database(msg) => write!(f, "database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Lookup and maintenance of accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Checks that the backend answers. Backends without a connection are always up.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Any user holding either `username` or `email`. Used to report duplicates before
    /// attempting an insert.
    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError>;

    async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<User>, StoreError>;

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Persists username, email and password hash of `user`, matched by id.
    /// Returns `None` if the user no longer exists.
    async fn update_user(&self, user: &User) -> Result<Option<User>, StoreError>;

    /// Deletes the user and every task they own. Returns whether a user was removed.
    async fn delete_user(&self, id: i32) -> Result<bool, StoreError>;
}

/// Owner-scoped task storage.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: &Task) -> Result<Task, StoreError>;

    /// Tasks of `owner` matching `query`, oldest first, paginated by `offset`/`limit`.
    async fn list_tasks(&self, owner: i32, query: &TaskQuery) -> Result<Vec<Task>, StoreError>;

    async fn find_task(&self, owner: i32, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Writes the mutable fields of `task`, matched by id *and* owner.
    async fn update_task(&self, owner: i32, task: &Task) -> Result<Option<Task>, StoreError>;

    async fn delete_task(&self, owner: i32, id: Uuid) -> Result<bool, StoreError>;
}

/// Everything the application needs from a backend.
pub trait Store: UserStore + TaskStore {}

impl<T: UserStore + TaskStore> Store for T {}
