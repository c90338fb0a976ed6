use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{Task, TaskInput, TaskList, TaskQuery, TaskUpdate},
    state::AppState,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

pub(crate) const TASK_NOT_FOUND: &str = "Task not found.";

/// Retrieves a list of tasks for the authenticated user.
///
/// ## Query Parameters:
/// - `title`, `description` (optional): case-insensitive substring match.
/// - `state` (optional): one of `draft`, `task`, `doing`, `done`, `trash`.
/// - `priority` (optional): one of `low`, `medium`, `high`.
/// - `due_before` (optional): RFC 3339 instant; only tasks due at or before it.
/// - `offset` (default 0), `limit` (default 100): pagination.
///
/// ## Responses:
/// - `200 OK`: `{"tasks": [...]}`, oldest first.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("")]
pub async fn get_tasks(
    current_user: CurrentUser,
    state: web::Data<AppState>,
    query_params: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let tasks = state
        .store
        .list_tasks(current_user.id, &query_params)
        .await?;

    Ok(HttpResponse::Ok().json(TaskList { tasks }))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Task` object as JSON.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `422 Unprocessable Entity`: If input validation on `TaskInput` fails.
#[post("")]
pub async fn create_task(
    current_user: CurrentUser,
    state: web::Data<AppState>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), current_user.id);
    let task = state.store.insert_task(&task).await?;

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one of the authenticated user's tasks by id.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[get("/{id}")]
pub async fn get_task(
    current_user: CurrentUser,
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = state
        .store
        .find_task(current_user.id, task_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates one of the authenticated user's tasks.
///
/// Fields present in the body overwrite the stored ones; absent fields are kept.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `404 Not Found`: no such task, or it belongs to another user.
/// - `422 Unprocessable Entity`: If input validation on `TaskUpdate` fails.
#[patch("/{id}")]
pub async fn update_task(
    current_user: CurrentUser,
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let owner = current_user.id;

    let mut task = state
        .store
        .find_task(owner, task_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))?;

    task.apply(task_data.into_inner());

    let task = state
        .store
        .update_task(owner, &task)
        .await?
        .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes one of the authenticated user's tasks.
///
/// ## Responses:
/// - `200 OK`: confirmation message.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[delete("/{id}")]
pub async fn delete_task(
    current_user: CurrentUser,
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    if !state
        .store
        .delete_task(current_user.id, task_id.into_inner())
        .await?
    {
        return Err(AppError::NotFound(TASK_NOT_FOUND.into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Task has been deleted successfully." })))
}
