pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskList, TaskPriority, TaskQuery, TaskState, TaskUpdate};
pub use user::{NewUser, User, UserInput, UserList, UserListQuery, UserPublic};
