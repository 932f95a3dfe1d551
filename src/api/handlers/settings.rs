//! Gate status and gate configuration endpoints.

use axum::{Json, extract::Extension, http::HeaderMap};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use super::auth::{AuthState, require_auth};
use crate::api::error::{ApiError, ErrorBody};
use crate::storage::{GateConfig, Store};

/// Replacement gate configuration submitted by an administrator.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub is_open: bool,
    #[serde(default)]
    pub announcement_date: Option<DateTime<Utc>>,
}

#[utoipa::path(
    get,
    path = "/settings",
    responses(
        (status = 200, description = "Current gate configuration", body = GateConfig)
    ),
    tag = "settings"
)]
/// Public gate status, readable without authentication.
pub async fn get_settings(
    store: Extension<Arc<dyn Store>>,
) -> Result<Json<GateConfig>, ApiError> {
    let config = store.gate_config().await?.unwrap_or_default();
    Ok(Json(config))
}

#[utoipa::path(
    put,
    path = "/admin/settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Updated gate configuration", body = GateConfig),
        (status = 400, description = "Malformed payload", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    ),
    tag = "settings"
)]
/// Replace the gate configuration. The flag written here is the only thing
/// that opens or closes disclosure.
pub async fn update_settings(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<UpdateSettingsRequest>>,
) -> Result<Json<GateConfig>, ApiError> {
    require_auth(&headers, store.0.as_ref(), &auth_state).await?;

    let request = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::Validation("Format tidak valid".to_string())),
    };

    let config = store
        .set_gate_config(GateConfig {
            is_open: request.is_open,
            announcement_date: request.announcement_date,
        })
        .await?;

    info!(is_open = config.is_open, "Gate configuration updated");
    Ok(Json(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::AuthConfig;
    use crate::hash::CredentialHasher;
    use crate::storage::memory::MemStore;
    use axum::http::{HeaderValue, header::AUTHORIZATION};

    fn test_state() -> Arc<AuthState> {
        Arc::new(
            AuthState::new(
                AuthConfig::new("http://localhost:5173".to_string()),
                CredentialHasher::new().with_params(4, 2, 1),
            )
            .unwrap(),
        )
    }

    async fn admin_headers(store: &MemStore, state: &AuthState) -> HeaderMap {
        let admin = store
            .create_principal("admin@smkn2godean.sch.id", "digest.salt")
            .await
            .unwrap();
        let token = state.sessions().create(admin.id).await.unwrap();
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {token}");
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&bearer).unwrap());
        headers
    }

    #[tokio::test]
    async fn status_defaults_to_closed() {
        let store: Arc<dyn Store> = Arc::new(MemStore::default());
        let Json(config) = get_settings(Extension(store)).await.unwrap();
        assert!(!config.is_open);
        assert!(config.announcement_date.is_none());
    }

    #[tokio::test]
    async fn update_requires_a_session() {
        let store: Arc<dyn Store> = Arc::new(MemStore::default());
        let err = update_settings(
            HeaderMap::new(),
            Extension(store),
            Extension(test_state()),
            Some(Json(UpdateSettingsRequest {
                is_open: true,
                announcement_date: None,
            })),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn update_replaces_the_stored_row() {
        let store = MemStore::default();
        let state = test_state();
        let headers = admin_headers(&store, &state).await;
        let store: Arc<dyn Store> = Arc::new(store);

        let Json(updated) = update_settings(
            headers,
            Extension(store.clone()),
            Extension(state),
            Some(Json(UpdateSettingsRequest {
                is_open: true,
                announcement_date: None,
            })),
        )
        .await
        .unwrap();
        assert!(updated.is_open);

        let Json(read_back) = get_settings(Extension(store)).await.unwrap();
        assert!(read_back.is_open);
    }
}
