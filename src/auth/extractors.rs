use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::auth::resolver::resolve_principal;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// The authenticated user of the current request.
///
/// Taking `CurrentUser` as a handler argument makes the route protected: the extractor
/// reads the `Authorization` header and resolves it against the token service and user
/// store held in [`AppState`]. On failure the handler never runs and the client gets the
/// uniform 401.
///
/// Put it first in the argument list. Actix polls extractors in order and stops at the
/// first error, and a missing or bad token fails on the first poll, so a request without
/// valid credentials gets the 401 before its path or body are looked at.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl std::ops::Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                AppError::InternalServerError("AppState is not registered on the App".into())
            })?;
            let user = resolve_principal(
                authorization.as_deref(),
                &state.tokens,
                state.store.as_ref(),
            )
            .await?;
            Ok(CurrentUser(user))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::store::{MemoryStore, UserStore};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use actix_web::ResponseError;

    async fn state_with_user() -> web::Data<AppState> {
        let store = MemoryStore::new();
        store
            .insert_user(NewUser {
                username: "testuser".into(),
                email: "e@test.com".into(),
                password_hash: "irrelevant".into(),
            })
            .await
            .unwrap();
        web::Data::new(AppState::for_tests(store))
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_success() {
        let state = state_with_user().await;
        let token = state.tokens.issue("e@test.com").unwrap();
        let req = test::TestRequest::default()
            .app_data(state.clone())
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_request();

        let mut payload = Payload::None;
        let user = CurrentUser::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(user.email, "e@test.com");
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_failure() {
        let state = state_with_user().await;
        let req = test::TestRequest::default()
            .app_data(state)
            .to_http_request();

        let mut payload = Payload::None;
        let err = CurrentUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_without_state() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = CurrentUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
