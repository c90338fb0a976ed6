use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// A registered account, as stored. This is also the authenticated principal handed to
/// handlers once a bearer token has been resolved.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Unique, and used as the subject of issued tokens.
    pub email: String,
    /// bcrypt hash. Never leaves the server; see [`UserPublic`].
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The outward view of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Payload for registering a user and for replacing one's own account.
#[derive(Debug, Deserialize, Validate)]
pub struct UserInput {
    /// Must be between 3 and 32 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    // Column is VARCHAR(255).
    #[validate(email, length(max = 255))]
    pub email: String,
    // bcrypt only looks at the first 72 bytes.
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// A user about to be inserted; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<UserPublic>,
}

/// `skip`/`limit` pagination for the user listing.
#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

pub(crate) fn default_limit() -> u32 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_input_validation() {
        let input = UserInput {
            username: "testuser".to_string(),
            email: "e@test.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(input.validate().is_ok());

        let input = UserInput {
            username: "testuser".to_string(),
            email: "invalid-email".to_string(),
            password: "password123".to_string(),
        };
        assert!(input.validate().is_err());

        let input = UserInput {
            username: "test user!".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(input.validate().is_err());

        let input = UserInput {
            username: "tu".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(input.validate().is_err());

        let input = UserInput {
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password: "".to_string(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_email_fits_the_column() {
        let domain = format!("{}.{}.{}.com", "b".repeat(63), "c".repeat(63), "d".repeat(63));
        let fits = format!("{}@{}", "a".repeat(59), domain);
        let too_long = format!("{}@{}", "a".repeat(64), domain);
        assert_eq!(fits.len(), 255);

        let input = |email: &str| UserInput {
            username: "testuser".to_string(),
            email: email.to_string(),
            password: "pw".to_string(),
        };
        assert!(input(&fits).validate().is_ok());
        assert!(input(&too_long).validate().is_err());
    }

    #[test]
    fn test_public_view_drops_hash() {
        let user = User {
            id: 7,
            username: "bob".into(),
            email: "bob@test.com".into(),
            password_hash: "$2b$04$abc".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(UserPublic::from(&user)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 7, "username": "bob", "email": "bob@test.com" })
        );
    }
}
