//! Persistent state behind the service: administrators, the student roster,
//! and the announcement gate configuration.
//!
//! [`Store`] abstracts the backing engine so the API runs against Postgres in
//! production and an in-memory map in tests or DSN-less deployments.
//! Implementations enforce the uniqueness of administrator emails and student
//! registration numbers.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

/// Administrator account able to manage the roster and the gate.
#[derive(Clone, Debug)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// Graduation verdict as exchanged on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Passed,
    Failed,
    Pending,
}

impl Outcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Pending => "PENDING",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PASSED" => Some(Self::Passed),
            "FAILED" => Some(Self::Failed),
            "PENDING" => Some(Self::Pending),
            _ => None,
        }
    }
}

/// Student roster row.
///
/// `primary_identifier` is the registration number (NIS) a visitor submits
/// for a lookup; it is unique across the roster.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub primary_identifier: String,
    pub name: String,
    pub category: String,
    pub birth_date: NaiveDate,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Fields accepted when creating or replacing a roster row.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub primary_identifier: String,
    pub name: String,
    pub category: String,
    pub birth_date: NaiveDate,
    pub outcome: Outcome,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The single gate configuration row. Defaults to closed with no date.
///
/// `is_open` is the sole source of truth for disclosure. The announcement
/// date is advisory metadata for countdown displays and never flips the
/// gate by itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GateConfig {
    pub is_open: bool,
    pub announcement_date: Option<DateTime<Utc>>,
}

/// Failures surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate unique key")]
    Duplicate,
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Backing store for principals, the roster, and the gate configuration.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch an administrator by email. The match is exact and case
    /// sensitive.
    async fn principal_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError>;

    async fn principal_by_id(&self, id: Uuid) -> Result<Option<Principal>, StoreError>;

    /// Insert a new administrator. Fails with [`StoreError::Duplicate`] when
    /// the email is taken.
    async fn create_principal(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Principal, StoreError>;

    async fn list_students(&self) -> Result<Vec<Student>, StoreError>;

    /// Fetch a student by registration number. Exact, case-sensitive match
    /// on a unique key.
    async fn student_by_identifier(
        &self,
        primary_identifier: &str,
    ) -> Result<Option<Student>, StoreError>;

    /// Insert a roster row. Fails with [`StoreError::Duplicate`] when the
    /// registration number is taken, leaving existing rows untouched.
    async fn create_student(&self, new: NewStudent) -> Result<Student, StoreError>;

    /// Replace a roster row. Fails with [`StoreError::NotFound`] for an
    /// unknown id and [`StoreError::Duplicate`] when the new registration
    /// number collides with another row.
    async fn update_student(&self, id: Uuid, new: NewStudent) -> Result<Student, StoreError>;

    async fn delete_student(&self, id: Uuid) -> Result<(), StoreError>;

    /// Read the gate row; `None` when nothing has been stored yet.
    async fn gate_config(&self) -> Result<Option<GateConfig>, StoreError>;

    /// Upsert the single gate row.
    async fn set_gate_config(&self, config: GateConfig) -> Result<GateConfig, StoreError>;

    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_round_trips_through_text() {
        for outcome in [Outcome::Passed, Outcome::Failed, Outcome::Pending] {
            assert_eq!(Outcome::parse(outcome.as_str()), Some(outcome));
        }
        assert_eq!(Outcome::parse("LULUS"), None);
        assert_eq!(Outcome::parse("passed"), None);
    }

    #[test]
    fn outcome_wire_format_is_screaming_snake() {
        let json = serde_json::to_string(&Outcome::Passed).unwrap();
        assert_eq!(json, "\"PASSED\"");
        let parsed: Outcome = serde_json::from_str("\"FAILED\"").unwrap();
        assert_eq!(parsed, Outcome::Failed);
    }

    #[test]
    fn gate_config_defaults_closed() {
        let config = GateConfig::default();
        assert!(!config.is_open);
        assert!(config.announcement_date.is_none());
    }

    #[test]
    fn student_serializes_camel_case_and_omits_empty_notes() {
        let student = Student {
            id: Uuid::nil(),
            primary_identifier: "12345".to_string(),
            name: "Budi Santoso".to_string(),
            category: "Teknik Komputer dan Jaringan".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2006, 5, 15).unwrap(),
            outcome: Outcome::Passed,
            notes: None,
        };
        let value = serde_json::to_value(&student).unwrap();
        assert_eq!(value["primaryIdentifier"], "12345");
        assert_eq!(value["birthDate"], "2006-05-15");
        assert!(value.get("notes").is_none());
    }
}
