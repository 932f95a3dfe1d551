//! Roster management endpoints, administrator only.
//!
//! These routes return full student records, identifier and birth date
//! included; the anti-enumeration rules apply to the public check, not
//! here.

use axum::{
    Json,
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::auth::{AuthState, require_auth};
use crate::api::error::{ApiError, ErrorBody};
use crate::storage::{NewStudent, Store, StoreError, Student};

/// Per-row accounting for a bulk import.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

#[utoipa::path(
    get,
    path = "/admin/students",
    responses(
        (status = 200, description = "Full roster", body = [Student]),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    ),
    tag = "students"
)]
/// List the whole roster.
pub async fn list(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Json<Vec<Student>>, ApiError> {
    require_auth(&headers, store.0.as_ref(), &auth_state).await?;
    let students = store.list_students().await?;
    Ok(Json(students))
}

#[utoipa::path(
    post,
    path = "/admin/students",
    request_body = NewStudent,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 400, description = "Malformed payload", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 409, description = "Identifier already registered", body = ErrorBody)
    ),
    tag = "students"
)]
/// Add one student to the roster.
pub async fn create(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<NewStudent>>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    require_auth(&headers, store.0.as_ref(), &auth_state).await?;

    let new = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::Validation("Format tidak valid".to_string())),
    };

    let student = store.create_student(new).await?;
    info!(id = %student.id, "Student created");
    Ok((StatusCode::CREATED, Json(student)))
}

#[utoipa::path(
    put,
    path = "/admin/students/{id}",
    request_body = NewStudent,
    params(
        ("id" = Uuid, Path, description = "Student id")
    ),
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, description = "Malformed payload", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "Unknown student id", body = ErrorBody),
        (status = 409, description = "Identifier already registered", body = ErrorBody)
    ),
    tag = "students"
)]
/// Replace one roster row.
pub async fn update(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    store: Extension<Arc<dyn Store>>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<NewStudent>>,
) -> Result<Json<Student>, ApiError> {
    require_auth(&headers, store.0.as_ref(), &auth_state).await?;

    let new = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::Validation("Format tidak valid".to_string())),
    };

    let student = store.update_student(id, new).await?;
    info!(id = %student.id, "Student updated");
    Ok(Json(student))
}

#[utoipa::path(
    delete,
    path = "/admin/students/{id}",
    params(
        ("id" = Uuid, Path, description = "Student id")
    ),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "Unknown student id", body = ErrorBody)
    ),
    tag = "students"
)]
/// Delete one roster row.
pub async fn remove(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    store: Extension<Arc<dyn Store>>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<StatusCode, ApiError> {
    require_auth(&headers, store.0.as_ref(), &auth_state).await?;
    store.delete_student(id).await?;
    info!(id = %id, "Student deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/admin/students/import",
    request_body = [NewStudent],
    responses(
        (status = 200, description = "Import accounting", body = ImportSummary),
        (status = 400, description = "Malformed payload", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    ),
    tag = "students"
)]
/// Import many students in one request.
///
/// Rows whose identifier is already taken, by the roster or by an earlier
/// row of the same batch, are skipped rather than aborting the batch.
pub async fn import(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<Vec<NewStudent>>>,
) -> Result<Json<ImportSummary>, ApiError> {
    require_auth(&headers, store.0.as_ref(), &auth_state).await?;

    let rows = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::Validation("Invalid import format".to_string())),
    };

    let mut summary = ImportSummary {
        imported: 0,
        skipped: 0,
    };
    for row in rows {
        match store.create_student(row).await {
            Ok(_) => summary.imported += 1,
            Err(StoreError::Duplicate) => summary.skipped += 1,
            Err(err) => return Err(err.into()),
        }
    }

    info!(
        imported = summary.imported,
        skipped = summary.skipped,
        "Roster import finished"
    );
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::AuthConfig;
    use crate::hash::CredentialHasher;
    use crate::storage::Outcome;
    use crate::storage::memory::MemStore;
    use axum::http::{HeaderValue, header::AUTHORIZATION};
    use chrono::NaiveDate;

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

    fn new_student(primary_identifier: &str) -> NewStudent {
        NewStudent {
            primary_identifier: primary_identifier.to_string(),
            name: "Budi Santoso".to_string(),
            category: "Teknik Komputer dan Jaringan".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2006, 5, 15).unwrap(),
            outcome: Outcome::Passed,
            notes: None,
        }
    }

    #[tokio::test]
    async fn roster_requires_a_session() {
        let store: Arc<dyn Store> = Arc::new(MemStore::default());
        let err = list(
            HeaderMap::new(),
            Extension(store),
            Extension(test_state()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn duplicate_identifier_conflicts_and_keeps_one_row() {
        let store = MemStore::default();
        let state = test_state();
        let headers = admin_headers(&store, &state).await;
        let store: Arc<dyn Store> = Arc::new(store);

        let (status, _) = create(
            headers.clone(),
            Extension(store.clone()),
            Extension(state.clone()),
            Some(Json(new_student("12345"))),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let err = create(
            headers.clone(),
            Extension(store.clone()),
            Extension(state.clone()),
            Some(Json(new_student("12345"))),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateIdentifier));

        let Json(students) = list(headers, Extension(store), Extension(state))
            .await
            .unwrap();
        assert_eq!(students.len(), 1);
    }

    #[tokio::test]
    async fn updating_an_unknown_id_is_not_found() {
        let store = MemStore::default();
        let state = test_state();
        let headers = admin_headers(&store, &state).await;
        let store: Arc<dyn Store> = Arc::new(store);

        let err = update(
            headers,
            Path(Uuid::new_v4()),
            Extension(store),
            Extension(state),
            Some(Json(new_student("12345"))),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::StudentNotFound));
    }

    #[tokio::test]
    async fn delete_is_not_idempotent() {
        let store = MemStore::default();
        let state = test_state();
        let headers = admin_headers(&store, &state).await;
        let store: Arc<dyn Store> = Arc::new(store);

        let (_, Json(student)) = create(
            headers.clone(),
            Extension(store.clone()),
            Extension(state.clone()),
            Some(Json(new_student("12345"))),
        )
        .await
        .unwrap();

        let status = remove(
            headers.clone(),
            Path(student.id),
            Extension(store.clone()),
            Extension(state.clone()),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = remove(headers, Path(student.id), Extension(store), Extension(state))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::StudentNotFound));
    }

    #[tokio::test]
    async fn import_skips_duplicates_without_aborting() {
        let store = MemStore::default();
        let state = test_state();
        let headers = admin_headers(&store, &state).await;
        let store: Arc<dyn Store> = Arc::new(store);

        store.create_student(new_student("12345")).await.unwrap();

        let Json(summary) = import(
            headers,
            Extension(store.clone()),
            Extension(state),
            Some(Json(vec![
                new_student("12345"),
                new_student("12346"),
                new_student("12346"),
                new_student("12347"),
            ])),
        )
        .await
        .unwrap();

        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped, 2);
        assert_eq!(store.list_students().await.unwrap().len(), 3);
    }
}
