//! Resolution of the authenticated administrator from request headers.

use axum::http::HeaderMap;
use uuid::Uuid;

use super::{session::extract_session_token, state::AuthState};
use crate::api::error::ApiError;
use crate::storage::Store;

/// Authenticated administrator resolved from a live session.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
}

/// Resolve the session on the request to an administrator record.
///
/// Every failure mode maps to the same 401 so callers leak nothing about
/// which stage rejected the request.
///
/// # Errors
/// Returns `ApiError::Unauthenticated` when no token is presented, the token
/// is unknown or expired, or the administrator no longer exists.
pub async fn require_auth(
    headers: &HeaderMap,
    store: &dyn Store,
    auth_state: &AuthState,
) -> Result<Principal, ApiError> {
    let token = extract_session_token(headers).ok_or(ApiError::Unauthenticated)?;

    let principal_id = auth_state
        .sessions()
        .lookup(&token)
        .await
        .ok_or(ApiError::Unauthenticated)?;

    // A session for a deleted administrator is treated as expired.
    let principal = store
        .principal_by_id(principal_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    Ok(Principal {
        id: principal.id,
        email: principal.email,
    })
}
