pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::error::AppError;

/// Registers every endpoint. Protection is per handler: those taking a
/// [`crate::auth::CurrentUser`] argument require a bearer token.
///
/// Body and query extraction failures are reported through [`AppError::BadRequest`] so
/// they share the `{"detail": ...}` shape of every other error. An id that doesn't parse
/// is answered exactly like an id that doesn't exist.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default().error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default().error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default().error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(health::health)
    .service(web::scope("/auth").service(auth::login_for_access_token))
    .service(
        web::scope("/users")
            .app_data(not_found_on_bad_id(users::USER_NOT_FOUND))
            .service(users::create_user)
            .service(users::list_users)
            .service(users::update_user)
            .service(users::delete_user),
    )
    .service(
        web::scope("/tasks")
            .app_data(not_found_on_bad_id(tasks::TASK_NOT_FOUND))
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}

fn not_found_on_bad_id(detail: &'static str) -> web::PathConfig {
    web::PathConfig::default().error_handler(move |err, _req| {
        log::debug!("unparsable id in path: {}", err);
        AppError::NotFound(detail.into()).into()
    })
}
