use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Represents the lifecycle state of a task.
/// Corresponds to the `task_state` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Not yet committed to.
    Draft,
    /// Planned work.
    Task,
    /// Being worked on.
    Doing,
    Done,
    /// Discarded but kept around.
    Trash,
}

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters.
    #[validate(length(max = 1000))]
    pub description: String,

    pub state: TaskState,

    pub priority: TaskPriority,

    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update of a task. Fields left out of the request body are left untouched;
/// `"due_date": null` clears the due date.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub state: Option<TaskState>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Maps a present field (even `null`) to `Some`, so that `#[serde(default)]` alone
/// produces `None` for an absent one.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub state: TaskState,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Owner. Set from the authenticated user at creation and never changed afterwards.
    pub user_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

/// Represents query parameters for filtering tasks when listing them.
/// Listing is always scoped to the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
    pub state: Option<TaskState>,
    pub priority: Option<TaskPriority>,
    /// Only tasks due at or before this instant. Tasks without a due date never match.
    pub due_before: Option<DateTime<Utc>>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "crate::models::user::default_limit")]
    pub limit: u32,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            state: None,
            priority: None,
            due_before: None,
            offset: 0,
            limit: crate::models::user::default_limit(),
        }
    }
}

impl TaskQuery {
    /// Whether `task` passes every filter that is set. Empty text filters are ignored.
    pub fn matches(&self, task: &Task) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            match needle.as_deref() {
                Some(needle) if !needle.is_empty() => {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                }
                _ => true,
            }
        }

        contains(&task.title, &self.title)
            && contains(&task.description, &self.description)
            && self.state.map_or(true, |state| task.state == state)
            && self.priority.map_or(true, |priority| task.priority == priority)
            && self
                .due_before
                .map_or(true, |limit| task.due_date.map_or(false, |due| due <= limit))
    }
}

impl Task {
    /// Creates a new `Task` owned by `user_id`, with a fresh id and timestamps.
    pub fn new(input: TaskInput, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            state: input.state,
            priority: input.priority,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
            user_id,
        }
    }

    /// Merges `update` into this task: every field present in the update overwrites the
    /// current value, absent fields are kept. Ownership is not part of the update.
    pub fn apply(&mut self, update: TaskUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(state) = update.state {
            self.state = state;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: "Test Description".to_string(),
            state: TaskState::Draft,
            priority: TaskPriority::High,
            due_date: Some(Utc::now()),
        }
    }

    #[test]
    fn test_task_creation() {
        let task = Task::new(input("Test Task"), 1);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.user_id, 1);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_task_validation() {
        assert!(input("Valid Task").validate().is_ok());
        assert!(input("").validate().is_err());
        assert!(input(&"a".repeat(201)).validate().is_err());

        let mut long_description = input("Valid title");
        long_description.description = "b".repeat(1001);
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_apply_only_touches_present_fields() {
        let mut task = Task::new(input("Original"), 3);
        let before = task.clone();

        let update: TaskUpdate = serde_json::from_str(r#"{"title": "teste!"}"#).unwrap();
        task.apply(update);

        assert_eq!(task.title, "teste!");
        assert_eq!(task.description, before.description);
        assert_eq!(task.state, before.state);
        assert_eq!(task.priority, before.priority);
        assert_eq!(task.due_date, before.due_date);
        assert_eq!(task.user_id, 3);
        assert_eq!(task.id, before.id);
    }

    #[test]
    fn test_apply_null_due_date_clears_it() {
        let mut task = Task::new(input("Due"), 1);
        assert!(task.due_date.is_some());

        let update: TaskUpdate = serde_json::from_str(r#"{"due_date": null, "state": "done"}"#).unwrap();
        task.apply(update);

        assert_eq!(task.due_date, None);
        assert_eq!(task.state, TaskState::Done);
    }

    #[test]
    fn test_update_ignores_owner_field() {
        let update: TaskUpdate = serde_json::from_str(r#"{"user_id": 99}"#).unwrap();
        let mut task = Task::new(input("Mine"), 1);
        task.apply(update);
        assert_eq!(task.user_id, 1);
    }

    #[test]
    fn test_query_matches() {
        let now = Utc::now();
        let mut task = Task::new(input("Write the Report"), 1);
        task.due_date = Some(now);

        let query = TaskQuery {
            title: Some("report".into()),
            ..Default::default()
        };
        assert!(query.matches(&task));

        let query = TaskQuery {
            title: Some("".into()),
            state: Some(TaskState::Draft),
            due_before: Some(now + Duration::days(1)),
            ..Default::default()
        };
        assert!(query.matches(&task));

        let query = TaskQuery {
            due_before: Some(now - Duration::days(1)),
            ..Default::default()
        };
        assert!(!query.matches(&task));

        task.due_date = None;
        let query = TaskQuery {
            due_before: Some(now),
            ..Default::default()
        };
        assert!(!query.matches(&task));

        let query = TaskQuery {
            priority: Some(TaskPriority::Low),
            ..Default::default()
        };
        assert!(!query.matches(&task));
    }

    #[test]
    fn test_state_wire_names() {
        assert_eq!(serde_json::to_value(TaskState::Doing).unwrap(), "doing");
        assert_eq!(serde_json::to_value(TaskPriority::Medium).unwrap(), "medium");
    }
}
