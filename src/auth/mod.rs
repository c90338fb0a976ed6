//! Authentication and authorization.
//!
//! - [`password`]: bcrypt hashing of credentials
//! - [`token`]: HS256 access token issuance and validation
//! - [`resolver`]: bearer header → authenticated [`crate::models::User`]
//! - [`extractors`]: the [`CurrentUser`] extractor wiring the resolver into handlers
//! - [`guard`]: ownership checks on self-targeting account operations

pub mod extractors;
pub mod guard;
pub mod password;
pub mod resolver;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export necessary items
pub use extractors::CurrentUser;
pub use guard::ensure_self;
pub use password::PasswordHasher;
pub use resolver::resolve_principal;
pub use token::{Claims, TokenError, TokenService};

/// Form body of `POST /auth/token`. Follows the OAuth2 password grant field names, so
/// `username` carries the email address.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Response of a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_ignores_scope() {
        let form = parse_form("username=e%40test.com&password=pw&scope=");
        assert_eq!(form.username, "e@test.com");
        assert_eq!(form.password, "pw");
    }

    fn parse_form(body: &str) -> LoginForm {
        actix_web::web::Query::<LoginForm>::from_query(body)
            .unwrap()
            .into_inner()
    }

    #[test]
    fn test_token_response_shape() {
        let json = serde_json::to_value(TokenResponse::bearer("abc".into())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "access_token": "abc", "token_type": "Bearer" })
        );
    }
}
