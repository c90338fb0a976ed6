use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::config::Config;
use crate::error::AppError;

/// The only algorithm tokens are signed with, and the only one accepted when decoding.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject of the token: the user's email.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Any additional claims supplied at issuance.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Why a token was rejected. Only ever logged; clients see a single 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, unexpected algorithm, missing claims or not a JWT at all.
    Invalid,
    /// Well-formed and correctly signed, but past its expiry.
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::Invalid => write!(f, "invalid token"),
            TokenError::Expired => write!(f, "expired token"),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> TokenError {
        match error.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        }
    }
}

/// Issues and validates HS256 access tokens.
///
/// The key and TTL are fixed at construction. Nothing is stored server-side, so changing the
/// secret invalidates every token issued before.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ALGORITHM)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;
        // `aud`, like any other extra claim, is carried and returned, not checked.
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, Duration::minutes(config.token_ttl_minutes))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `subject`, valid for the configured TTL starting now.
    pub fn issue(&self, subject: &str) -> Result<String, AppError> {
        self.issue_with_claims(subject, Map::new())
    }

    /// Like [`TokenService::issue`], with additional claims embedded in the payload.
    /// Entries named `sub`, `iat` or `exp` are dropped.
    pub fn issue_with_claims(&self, subject: &str, extra: Map<String, Value>) -> Result<String, AppError> {
        self.issue_at(subject, extra, Utc::now())
    }

    /// Issues a token as if it were `issued_at`. Mostly useful to produce expired tokens.
    pub fn issue_at(
        &self,
        subject: &str,
        mut extra: Map<String, Value>,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        for reserved in RESERVED_CLAIMS {
            extra.remove(reserved);
        }

        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
            extra,
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature, algorithm and expiry, and returns the claims.
    ///
    /// A token is accepted strictly before its `exp` instant.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
