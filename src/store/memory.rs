//! In-memory store.
//!
//! Suitable for tests and single-process local runs; nothing survives a restart. Unique
//! constraints and owner scoping behave exactly like the Postgres schema.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TaskStore, UniqueField, UserStore};
use crate::models::{NewUser, Task, TaskQuery, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tasks: Vec<Task>,
    last_user_id: i32,
}

impl Tables {
    /// Checks the username/email constraints for a row with id `except` being written.
    fn check_unique(&self, username: &str, email: &str, except: Option<i32>) -> Result<(), StoreError> {
        for user in self.users.iter().filter(|u| Some(u.id) != except) {
            if user.username == username {
                return Err(StoreError::UniqueViolation(UniqueField::Username));
            }
            if user.email == email {
                return Err(StoreError::UniqueViolation(UniqueField::Email));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_unique(&user.username, &user.email, None)?;

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_unique(&user.username, &user.email, Some(user.id))?;

        Ok(tables.users.iter_mut().find(|u| u.id == user.id).map(|stored| {
            stored.username = user.username.clone();
            stored.email = user.email.clone();
            stored.password_hash = user.password_hash.clone();
            stored.clone()
        }))
    }

    async fn delete_user(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Ok(false);
        }
        tables.tasks.retain(|t| t.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: &Task) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == task.user_id) {
            return Err(StoreError::Database(format!(
                "task owner {} does not exist",
                task.user_id
            )));
        }
        tables.tasks.push(task.clone());
        Ok(task.clone())
    }

    async fn list_tasks(&self, owner: i32, query: &TaskQuery) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| t.user_id == owner && query.matches(t))
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn find_task(&self, owner: i32, id: Uuid) -> Result<Option<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .find(|t| t.id == id && t.user_id == owner)
            .cloned())
    }

    async fn update_task(&self, owner: i32, task: &Task) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id && t.user_id == owner)
            .map(|stored| {
                stored.title = task.title.clone();
                stored.description = task.description.clone();
                stored.state = task.state;
                stored.priority = task.priority;
                stored.due_date = task.due_date;
                stored.updated_at = task.updated_at;
                stored.clone()
            }))
    }

    async fn delete_task(&self, owner: i32, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables.tasks.retain(|t| !(t.id == id && t.user_id == owner));
        Ok(tables.tasks.len() != before)
    }
}
