#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{http::header, test, web};
use serde_json::{json, Value};
use taskvault::auth::TokenResponse;
use taskvault::state::AppState;
use taskvault::store::MemoryStore;

// Helper struct to hold auth details
pub struct TestUser {
    pub id: i32,
    pub email: String,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

/// Fresh state over an empty in-memory store.
pub fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState::for_tests(MemoryStore::new()))
}

pub async fn register_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    email: &str,
    password: &str,
) -> Result<Value, String> {
    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if status != actix_web::http::StatusCode::CREATED {
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    serde_json::from_slice(&body).map_err(|e| format!("Failed to parse registration response: {}", e))
}

pub async fn login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> Result<String, String> {
    let req = test::TestRequest::post()
        .uri("/auth/token")
        .set_form([("username", email), ("password", password)])
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if !status.is_success() {
        return Err(format!(
            "Failed to log in. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    let token: TokenResponse =
        serde_json::from_slice(&body).map_err(|e| format!("Failed to parse login response: {}", e))?;
    Ok(token.access_token)
}

pub async fn register_and_login_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    email: &str,
    password: &str,
) -> Result<TestUser, String> {
    let user = register_user(app, username, email, password).await?;
    let id = user["id"]
        .as_i64()
        .ok_or_else(|| format!("Registration response has no id: {}", user))? as i32;
    let token = login(app, email, password).await?;

    Ok(TestUser {
        id,
        email: email.to_string(),
        token,
    })
}
