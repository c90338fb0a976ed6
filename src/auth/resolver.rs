//! Resolution of the authenticated principal for a request.
//!
//! This is the only way a request obtains an identity. Every way it can fail (no header,
//! wrong scheme, bad or expired token, unknown subject) ends in the same
//! [`AppError::Unauthorized`], so responses can't be used to probe which check tripped.
//! The actual reason is logged at debug level.

use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::models::User;
use crate::store::UserStore;

/// Extracts the token from an `Authorization` header value of the form `Bearer <token>`.
/// The scheme is matched case-insensitively.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolves the user behind `authorization`, the raw `Authorization` header if any.
pub async fn resolve_principal<S>(
    authorization: Option<&str>,
    tokens: &TokenService,
    users: &S,
) -> Result<User, AppError>
where
    S: UserStore + ?Sized,
{
    let token = match authorization.and_then(bearer_token) {
        Some(token) => token,
        None => {
            log::debug!("authentication failed: missing or malformed bearer credential");
            return Err(AppError::Unauthorized);
        }
    };

    let claims = tokens.decode(token).map_err(|e| {
        log::debug!("authentication failed: {}", e);
        AppError::from(e)
    })?;

    match users.find_user_by_email(&claims.sub).await? {
        Some(user) => Ok(user),
        None => {
            log::debug!("authentication failed: no user for token subject");
            Err(AppError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};
    use serde_json::Map;

    fn tokens() -> TokenService {
        TokenService::new("resolver-secret", Duration::minutes(30))
    }

    async fn store_with_user() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_user(NewUser {
                username: "testuser".into(),
                email: "e@test.com".into(),
                password_hash: "irrelevant".into(),
            })
            .await
            .unwrap();
        store
    }

    fn assert_unauthorized(result: Result<User, AppError>) {
        match result {
            Err(AppError::Unauthorized) => {}
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token(""), None);
    }

    #[actix_rt::test]
    async fn test_resolves_known_subject() {
        let store = store_with_user().await;
        let token = tokens().issue("e@test.com").unwrap();
        let header = format!("Bearer {}", token);

        let user = resolve_principal(Some(&header), &tokens(), &store).await.unwrap();
        assert_eq!(user.email, "e@test.com");
        assert_eq!(user.username, "testuser");
    }

    #[actix_rt::test]
    async fn test_missing_header() {
        let store = store_with_user().await;
        assert_unauthorized(resolve_principal(None, &tokens(), &store).await);
    }

    #[actix_rt::test]
    async fn test_every_failure_is_the_same_failure() {
        let store = store_with_user().await;

        let forged = TokenService::new("other-secret", Duration::minutes(30))
            .issue("e@test.com")
            .unwrap();
        let expired = tokens()
            .issue_at("e@test.com", Map::new(), Utc::now() - Duration::hours(1))
            .unwrap();
        let unknown = tokens().issue("ghost@test.com").unwrap();

        let headers = [
            "Bearer token invalido".to_string(),
            format!("Bearer {}", forged),
            format!("Bearer {}", expired),
            format!("Bearer {}", unknown),
            format!("Token {}", tokens().issue("e@test.com").unwrap()),
        ];

        for header in headers.iter() {
            assert_unauthorized(resolve_principal(Some(header), &tokens(), &store).await);
        }
    }
}
