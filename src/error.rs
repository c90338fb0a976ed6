//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a handler can produce is translated exactly once, here, into an HTTP
//! status and a minimal JSON body of the form `{"detail": "..."}`.
//!
//! Authentication failures collapse into a single variant,
//! [`AppError::Unauthorized`], whose message never changes: an expired token, a forged
//! token and a token for a deleted account all look the same to the client. The
//! internal reason is logged by the caller before the conversion happens.
//!
//! `AppError` implements `actix_web::error::ResponseError`, and provides `From`
//! implementations for `validator::ValidationErrors`, `bcrypt::BcryptError`,
//! [`StoreError`] and [`TokenError`] so handlers can use the `?` operator.

use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::token::TokenError;
use crate::store::{StoreError, UniqueField};

/// Body of every 401 response.
pub const UNAUTHENTICATED_DETAIL: &str = "Could not validate credentials";
/// Body of a failed login, regardless of whether the email or the password was wrong.
pub const INVALID_CREDENTIALS_DETAIL: &str = "Incorrect password or email";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Login with an unknown email or a wrong password (HTTP 400).
    InvalidCredentials,
    /// Missing, malformed, forged or expired token, or a token whose subject no longer
    /// exists (HTTP 401). Carries no message.
    Unauthorized,
    /// The caller is authenticated but may not act on the targeted resource (HTTP 403).
    Forbidden(String),
    /// Resource absent, or owned by somebody else (HTTP 404).
    NotFound(String),
    /// Unique constraint violation on username or email (HTTP 409).
    Conflict(String),
    /// Malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// Input failed `validator` rules (HTTP 422 Unprocessable Entity).
    ValidationError(String),
    /// Error reported by the persistence layer (HTTP 500).
    DatabaseError(String),
    /// Any other unexpected server-side error (HTTP 500).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::InvalidCredentials => write!(f, "Bad Request: {}", INVALID_CREDENTIALS_DETAIL),
            AppError::Unauthorized => write!(f, "Unauthorized: {}", UNAUTHENTICATED_DETAIL),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl AppError {
    /// The message exposed to the client.
    fn detail(&self) -> &str {
        match self {
            AppError::InvalidCredentials => INVALID_CREDENTIALS_DETAIL,
            AppError::Unauthorized => UNAUTHENTICATED_DETAIL,
            AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg)
            | AppError::ValidationError(msg) => msg,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => "Internal server error",
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::DatabaseError(msg) | AppError::InternalServerError(msg) = self {
            log::error!("{}", msg);
        }

        let mut response = HttpResponse::build(self.status_code());
        if let AppError::Unauthorized = self {
            response.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        response.json(json!({ "detail": self.detail() }))
    }
}

/// Recovers the `AppError` behind an extractor failure, e.g. when a handler takes
/// `Result<web::Json<T>, AppError>` to decide for itself when a bad body matters.
/// The extractor configs in [`crate::routes::config`] already build `AppError`s; anything
/// else is treated as a bad request.
impl From<actix_web::Error> for AppError {
    fn from(error: actix_web::Error) -> AppError {
        match error.as_error::<AppError>() {
            Some(app_error) => app_error.clone(),
            None => AppError::BadRequest(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Password hashing failed: {}", error))
    }
}

/// Every token failure is the same failure from the client's point of view.
impl From<TokenError> for AppError {
    fn from(_: TokenError) -> AppError {
        AppError::Unauthorized
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::UniqueViolation(UniqueField::Username) => {
                AppError::Conflict("Username already exists".into())
            }
            StoreError::UniqueViolation(UniqueField::Email) => {
                AppError::Conflict("Email already exists".into())
            }
            StoreError::Database(msg) => AppError::DatabaseError(msg),
        }
    }
}
