use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Ownership rule shared by post and comment mutations: only the recorded
/// author may update or delete. Call after the record has been loaded so a
/// missing record reports 404 rather than 403.
pub fn ensure_owner(requester: &AuthUser, owner_id: i64) -> Result<(), ApiError> {
    if requester.id == owner_id {
        return Ok(());
    }
    tracing::warn!(
        "User '{}' (id {}) denied mutation of content owned by user {}",
        requester.username,
        requester.id,
        owner_id
    );
    Err(ApiError::forbidden("Changing other users' content is not allowed."))
}
