//! Authorization checks that run after the principal has been resolved.
//!
//! Account endpoints name their target in the path, and a caller may only act on their own
//! account: anything else is `Forbidden`. Tasks are handled differently. Their ownership is
//! part of every store query (see [`crate::store::TaskStore`]), so a foreign task is
//! reported as not found rather than forbidden.

use crate::error::AppError;
use crate::models::User;

pub const FORBIDDEN_DETAIL: &str = "Not enough permissions";

/// Fails with `Forbidden` unless `principal` is the account identified by `target_id`.
pub fn ensure_self(principal: &User, target_id: i32) -> Result<(), AppError> {
    if principal.id == target_id {
        Ok(())
    } else {
        log::debug!(
            "user {} denied access to account {}",
            principal.id,
            target_id
        );
        Err(AppError::Forbidden(FORBIDDEN_DETAIL.into()))
    }
}
