//! Health probe handlers.
//!
//! Two probes: `/live` answers on process liveness alone, `/health` checks
//! store connectivity and reports service identity in a JSON payload.

use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::{Duration, timeout};
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::GIT_COMMIT_HASH;
use crate::storage::Store;

const HEALTH_DB_TIMEOUT_SECONDS: u64 = 2;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
}

#[utoipa::path(
    get,
    path = "/live",
    responses(
        (status = 200, description = "Process is alive")
    ),
    tag = "health",
)]
/// Liveness probe. Answers as long as the process runs, touching nothing
/// external.
pub async fn live() -> impl IntoResponse {
    StatusCode::OK
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store connection is healthy", body = Health),
        (status = 503, description = "Store connection is unhealthy", body = Health)
    ),
    tag = "health",
)]
/// Probe the backing store and report service identity.
pub async fn health(method: Method, store: Extension<Arc<dyn Store>>) -> impl IntoResponse {
    let healthy = match timeout(Duration::from_secs(HEALTH_DB_TIMEOUT_SECONDS), store.ping()).await
    {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            error!("Failed to ping the store: {err}");
            false
        }
        Err(_) => {
            warn!("Store health check timed out");
            false
        }
    };

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if healthy {
            "ok".to_string()
        } else {
            "unreachable".to_string()
        },
    };

    // HEAD probes keep the headers and drop the payload.
    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let headers = x_app_header(&health);

    if healthy {
        (StatusCode::OK, headers, body)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, headers, body)
    }
}

/// `X-App` response header: `name:version:short_commit`.
fn x_app_header(health: &Health) -> HeaderMap {
    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    format!("{}:{}:{}", health.name, health.version, short_hash)
        .parse::<HeaderValue>()
        .map(|value| {
            let mut headers = HeaderMap::new();
            headers.insert("X-App", value);
            headers
        })
        .unwrap_or_else(|err| {
            debug!("Failed to parse X-App header: {err}");
            HeaderMap::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemStore;
    use crate::storage::{GateConfig, NewStudent, Principal, Student};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use uuid::Uuid;

    use crate::storage::StoreError;

    struct DownStore;

    #[async_trait]
    impl Store for DownStore {
        async fn principal_by_email(&self, _email: &str) -> Result<Option<Principal>, StoreError> {
            Err(StoreError::Backend(anyhow!("store offline")))
        }

        async fn principal_by_id(&self, _id: Uuid) -> Result<Option<Principal>, StoreError> {
            Err(StoreError::Backend(anyhow!("store offline")))
        }

        async fn create_principal(
            &self,
            _email: &str,
            _password_hash: &str,
        ) -> Result<Principal, StoreError> {
            Err(StoreError::Backend(anyhow!("store offline")))
        }

        async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
            Err(StoreError::Backend(anyhow!("store offline")))
        }

        async fn student_by_identifier(
            &self,
            _primary_identifier: &str,
        ) -> Result<Option<Student>, StoreError> {
            Err(StoreError::Backend(anyhow!("store offline")))
        }

        async fn create_student(&self, _new: NewStudent) -> Result<Student, StoreError> {
            Err(StoreError::Backend(anyhow!("store offline")))
        }

        async fn update_student(&self, _id: Uuid, _new: NewStudent) -> Result<Student, StoreError> {
            Err(StoreError::Backend(anyhow!("store offline")))
        }

        async fn delete_student(&self, _id: Uuid) -> Result<(), StoreError> {
            Err(StoreError::Backend(anyhow!("store offline")))
        }

        async fn gate_config(&self) -> Result<Option<GateConfig>, StoreError> {
            Err(StoreError::Backend(anyhow!("store offline")))
        }

        async fn set_gate_config(&self, _config: GateConfig) -> Result<GateConfig, StoreError> {
            Err(StoreError::Backend(anyhow!("store offline")))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Backend(anyhow!("store offline")))
        }
    }

    #[tokio::test]
    async fn live_answers_ok() {
        let response = live().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn healthy_store_reports_ok() {
        let store: Arc<dyn Store> = Arc::new(MemStore::default());
        let response = health(Method::GET, Extension(store)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let x_app = response.headers().get("X-App").cloned();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: Health = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.database, "ok");
        assert_eq!(health.name, env!("CARGO_PKG_NAME"));
        assert!(x_app.is_some());
    }

    #[tokio::test]
    async fn unreachable_store_reports_503() {
        let store: Arc<dyn Store> = Arc::new(DownStore);
        let response = health(Method::GET, Extension(store)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: Health = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.database, "unreachable");
    }

    #[tokio::test]
    async fn head_probe_drops_the_body() {
        let store: Arc<dyn Store> = Arc::new(MemStore::default());
        let response = health(Method::HEAD, Extension(store)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}
