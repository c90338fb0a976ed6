use crate::{
    auth::{LoginForm, TokenResponse},
    error::AppError,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Login
///
/// Exchanges an email (sent as `username`) and password for a bearer token.
/// An unknown email and a wrong password produce the same 400 response, and both cost
/// one bcrypt verification.
#[post("/token")]
pub async fn login_for_access_token(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    let LoginForm { username, password } = form.into_inner();

    let user = state.store.find_user_by_email(&username).await?;
    let hashed_password = match &user {
        Some(user) => user.password_hash.clone(),
        None => state.hasher.decoy_hash(),
    };
    let verified = state.hasher.verify_blocking(password, hashed_password).await;

    let user = match user {
        Some(user) if verified => user,
        Some(user) => {
            log::debug!("login rejected: wrong password for user {}", user.id);
            return Err(AppError::InvalidCredentials);
        }
        None => {
            log::debug!("login rejected: unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    let access_token = state.tokens.issue(&user.email)?;
    log::info!("issued access token for user {}", user.id);

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(access_token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::store::MemoryStore;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    async fn app_state() -> web::Data<AppState> {
        let state = AppState::for_tests(MemoryStore::new());
        let password_hash = state.hasher.hash("testtest").unwrap();
        state
            .store
            .insert_user(NewUser {
                username: "testuser".into(),
                email: "e@test.com".into(),
                password_hash,
            })
            .await
            .unwrap();
        web::Data::new(state)
    }

    #[actix_rt::test]
    async fn test_login_issues_bearer_token() {
        let state = app_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(web::scope("/auth").service(login_for_access_token)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/token")
            .set_form([("username", "e@test.com"), ("password", "testtest"), ("scope", "")])
            .to_request();
        let resp: TokenResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.token_type, "Bearer");
        let claims = state.tokens.decode(&resp.access_token).unwrap();
        assert_eq!(claims.sub, "e@test.com");
    }

    #[actix_rt::test]
    async fn test_login_failures_are_uniform() {
        let app = test::init_service(
            App::new()
                .app_data(app_state().await)
                .service(web::scope("/auth").service(login_for_access_token)),
        )
        .await;

        for (username, password) in [("e@test.com", "wrong"), ("nobody@test.com", "testtest")] {
            let req = test::TestRequest::post()
                .uri("/auth/token")
                .set_form([("username", username), ("password", password)])
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({ "detail": "Incorrect password or email" }));
        }
    }
}
