//! The gated outcome check, the only public read of student data.

use axum::{Json, extract::Extension};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ErrorBody};
use crate::storage::{Outcome, Store};

/// Lookup credentials submitted by a visitor.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub primary_identifier: String,
    /// ISO calendar date, `YYYY-MM-DD`.
    pub birth_date: String,
}

/// Subset of a student record released on a successful check.
///
/// The identifier and birth date the visitor submitted are never echoed
/// back.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Disclosure {
    pub name: String,
    pub category: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Parse a strict `YYYY-MM-DD` calendar date.
fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    // `parse_from_str` alone accepts unpadded months and days.
    if !Regex::new(r"^\d{4}-\d{2}-\d{2}$").is_ok_and(|re| re.is_match(value)) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[utoipa::path(
    post,
    path = "/check",
    request_body = CheckRequest,
    responses(
        (status = 200, description = "Outcome disclosed", body = Disclosure),
        (status = 400, description = "Malformed input", body = ErrorBody),
        (status = 403, description = "Announcement window closed", body = ErrorBody),
        (status = 404, description = "No matching record", body = ErrorBody)
    ),
    tag = "check"
)]
/// Disclose one student's outcome when the gate is open and both submitted
/// fields match exactly.
pub async fn check(
    store: Extension<Arc<dyn Store>>,
    payload: Option<Json<CheckRequest>>,
) -> Result<Json<Disclosure>, ApiError> {
    let request = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::Validation("Invalid input format".to_string())),
    };

    // Shape errors answer 400 before the gate is consulted.
    let Some(birth_date) = parse_birth_date(&request.birth_date) else {
        return Err(ApiError::Validation("Invalid input format".to_string()));
    };

    let gate = store.gate_config().await?.unwrap_or_default();
    if !gate.is_open {
        debug!("Outcome check rejected while the gate is closed");
        return Err(ApiError::GateClosed);
    }

    let Some(student) = store
        .student_by_identifier(&request.primary_identifier)
        .await?
    else {
        return Err(ApiError::RecordNotFound);
    };

    // A wrong birth date answers exactly like an unknown identifier.
    if student.birth_date != birth_date {
        return Err(ApiError::RecordNotFound);
    }

    Ok(Json(Disclosure {
        name: student.name,
        category: student.category,
        outcome: student.outcome,
        notes: student.notes,
    }))
}
