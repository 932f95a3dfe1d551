//! Password login for administrators.

use anyhow::Context;
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use super::session::session_cookie;
use super::state::AuthState;
use crate::api::error::{ApiError, ErrorBody};
use crate::api::handlers::{MessageResponse, valid_email};
use crate::storage::Store;

/// Credentials submitted to `/auth/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session established", body = MessageResponse),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    ),
    tag = "auth"
)]
/// Verify submitted credentials and establish a session.
pub async fn login(
    store: Extension<Arc<dyn Store>>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Response, ApiError> {
    let request = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::Validation("Missing payload".to_string())),
    };

    // Shape checks only reflect the input back; they leak nothing about
    // which accounts exist.
    if !valid_email(&request.email) {
        return Err(ApiError::Validation("Invalid email".to_string()));
    }
    if request.password.is_empty() {
        return Err(ApiError::Validation("Missing credentials".to_string()));
    }

    let principal = store.principal_by_email(&request.email).await?;

    // Unknown emails still burn a derivation against a decoy hash so the
    // response time does not reveal whether the account exists.
    let (stored_hash, principal) = match principal {
        Some(principal) => (principal.password_hash.clone(), Some(principal)),
        None => (auth_state.decoy_hash().to_string(), None),
    };

    let hasher = auth_state.hasher();
    let password = request.password;
    let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
        .await
        .context("password verification task failed")?;

    let Some(principal) = principal.filter(|_| verified) else {
        debug!("Rejected login attempt");
        return Err(ApiError::InvalidCredentials);
    };

    let token = auth_state
        .sessions()
        .create(principal.id)
        .await
        .context("failed to create session")?;
    let cookie = session_cookie(&auth_state, &token).context("failed to build session cookie")?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok((
        StatusCode::OK,
        headers,
        Json(MessageResponse {
            message: "Logged in successfully".to_string(),
        }),
    )
        .into_response())
}
