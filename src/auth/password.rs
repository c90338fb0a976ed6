use actix_web::web;
use bcrypt::{hash, verify};

use crate::error::AppError;

// Salt and digest of an arbitrary bcrypt hash; matches no password anyone will send.
const DECOY_SALT_AND_DIGEST: &str = "R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

/// One-way, salted password hashing with bcrypt.
///
/// The work factor is fixed at construction. Every call to [`PasswordHasher::hash`] draws a
/// fresh salt, so hashing the same password twice gives two different strings which both
/// verify.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
    }

    /// Hashes on actix's blocking thread pool so the worker keeps serving other requests.
    pub async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let hasher = *self;
        web::block(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::InternalServerError(format!("Hashing task failed: {}", e)))?
    }

    /// Returns `true` iff `password` produced `hashed_password`.
    ///
    /// A malformed hash is a failed verification, not an error.
    pub fn verify(&self, password: &str, hashed_password: &str) -> bool {
        match verify(password, hashed_password) {
            Ok(valid) => valid,
            Err(e) => {
                log::debug!("rejecting unverifiable password hash: {}", e);
                false
            }
        }
    }

    /// A well-formed hash at this hasher's cost. Verifying against it takes as long as a
    /// real verification and always fails, which keeps a login for an unknown account from
    /// answering faster than one with a wrong password.
    pub fn decoy_hash(&self) -> String {
        format!("$2b${:02}${}", self.cost, DECOY_SALT_AND_DIGEST)
    }

    pub async fn verify_blocking(&self, password: String, hashed_password: String) -> bool {
        let hasher = *self;
        web::block(move || hasher.verify(&password, &hashed_password))
            .await
            .unwrap_or(false)
    }
}
