//! Boundary error taxonomy mapped onto HTTP statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::storage::StoreError;

/// Wire shape shared by every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

/// Failures surfaced at the HTTP boundary.
///
/// The two public lookup failures (unknown registration number, wrong birth
/// date) both map to [`ApiError::RecordNotFound`] so their responses cannot
/// drift apart. Login failures collapse into one generic message regardless
/// of whether the email exists.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Pengumuman belum dibuka")]
    GateClosed,
    #[error("Data siswa tidak ditemukan / Tanggal lahir salah")]
    RecordNotFound,
    #[error("Siswa tidak ditemukan")]
    StudentNotFound,
    #[error("NIS sudah terdaftar")]
    DuplicateIdentifier,
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::GateClosed => StatusCode::FORBIDDEN,
            Self::RecordNotFound | Self::StudentNotFound => StatusCode::NOT_FOUND,
            Self::DuplicateIdentifier => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => Self::DuplicateIdentifier,
            StoreError::NotFound => Self::StudentNotFound,
            StoreError::Backend(err) => Self::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Internal detail is logged, never returned to the client.
        if let Self::Internal(err) = &self {
            error!("Internal error: {err:#}");
        }
        let status = self.status();
        let body = Json(ErrorBody {
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}
