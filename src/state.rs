use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::Config;
use crate::store::Store;

/// Everything a handler needs, shared across workers through `web::Data<AppState>`.
///
/// All of it is read-only after startup except the store, which serializes its own access.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn Store>) -> Self {
        Self {
            store,
            tokens: TokenService::from_config(config),
            hasher: PasswordHasher::new(config.bcrypt_cost),
        }
    }

    /// State over `store` with a fixed secret, a 30 minute TTL and the cheapest bcrypt cost.
    pub fn for_tests<S: Store + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
            tokens: TokenService::new(
                "test-secret",
                chrono::Duration::minutes(crate::config::DEFAULT_TOKEN_TTL_MINUTES),
            ),
            hasher: PasswordHasher::new(4),
        }
    }
}
