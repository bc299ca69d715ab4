//! Ownership guard for mutating operations
//!
//! Call after the resource is loaded and before anything is written.

use super::AuthUser;
use crate::error::ApiError;
use tracing::warn;

/// Allow the request only if the caller owns the resource
pub fn authorize(owner_id: i64, caller: &AuthUser) -> Result<(), ApiError> {
    if owner_id == caller.user_id {
        return Ok(());
    }

    warn!(
        owner_id,
        caller_id = caller.user_id,
        "Ownership check failed"
    );
    Err(ApiError::Forbidden(
        "You do not have permission to modify this resource".to_string(),
    ))
}
