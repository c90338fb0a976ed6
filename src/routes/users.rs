use crate::{
    auth::{ensure_self, CurrentUser},
    error::AppError,
    models::{NewUser, User, UserInput, UserList, UserListQuery, UserPublic},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

pub(crate) const USER_NOT_FOUND: &str = "User not found";

/// Register a new user
///
/// Open to anyone. Usernames and emails are unique; a clash is reported as 409 naming
/// the field that clashed.
///
/// ## Responses:
/// - `201 Created`: the public view of the new user.
/// - `409 Conflict`: username or email already taken.
/// - `422 Unprocessable Entity`: input validation failed.
#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    user_data: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;
    let UserInput {
        username,
        email,
        password,
    } = user_data.into_inner();

    if let Some(existing) = state
        .store
        .find_user_by_username_or_email(&username, &email)
        .await?
    {
        let msg = if existing.username == username {
            "Username already exists"
        } else {
            "Email already exists"
        };
        return Err(AppError::Conflict(msg.into()));
    }

    let password_hash = state.hasher.hash_blocking(password).await?;

    // The store re-checks uniqueness, which covers a concurrent registration.
    let user = state
        .store
        .insert_user(NewUser {
            username,
            email,
            password_hash,
        })
        .await?;
    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(UserPublic::from(user)))
}

/// List users, paginated with `skip` and `limit`. Requires authentication.
#[get("")]
pub async fn list_users(
    _user: CurrentUser,
    state: web::Data<AppState>,
    query: web::Query<UserListQuery>,
) -> Result<impl Responder, AppError> {
    let users = state.store.list_users(query.skip, query.limit).await?;

    Ok(HttpResponse::Ok().json(UserList {
        users: users.iter().map(UserPublic::from).collect(),
    }))
}

/// Replace one's own account
///
/// Username, email and password are all overwritten. The path id must be the caller's;
/// that is checked before the body is even parsed.
///
/// ## Responses:
/// - `200 OK`: the public view of the updated user.
/// - `403 Forbidden`: the id is not the caller's.
/// - `409 Conflict`: the new username or email is taken by another user.
#[put("/{user_id}")]
pub async fn update_user(
    current_user: CurrentUser,
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
    user_data: Result<web::Json<UserInput>, AppError>,
) -> Result<impl Responder, AppError> {
    ensure_self(&current_user, user_id.into_inner())?;
    let user_data = user_data?;
    user_data.validate()?;
    let UserInput {
        username,
        email,
        password,
    } = user_data.into_inner();

    let password_hash = state.hasher.hash_blocking(password).await?;
    let replacement = User {
        username,
        email,
        password_hash,
        ..current_user.into_inner()
    };

    let user = state
        .store
        .update_user(&replacement)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.into()))?;
    log::info!("updated user {}", user.id);

    Ok(HttpResponse::Ok().json(UserPublic::from(user)))
}

/// Delete one's own account, together with all of its tasks.
///
/// ## Responses:
/// - `200 OK`: `{"message": "User deleted"}`.
/// - `403 Forbidden`: the id is not the caller's.
#[delete("/{user_id}")]
pub async fn delete_user(
    current_user: CurrentUser,
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    ensure_self(&current_user, user_id)?;

    if !state.store.delete_user(user_id).await? {
        return Err(AppError::NotFound(USER_NOT_FOUND.into()));
    }
    log::info!("deleted user {}", user_id);

    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted" })))
}
